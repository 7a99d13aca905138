use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;

use super::{DocumentError, DocumentReader};
use crate::chemistry::MassCalculator;
use crate::model::SrmDocument;
use crate::settings::SettingsReader;

impl<S: SettingsReader, C: MassCalculator> DocumentReader<S, C> {
    /// Read a document file
    ///
    /// The file is wrapped in a buffered reader sized by
    /// [`ReaderConfig::buffer_size`](super::ReaderConfig::buffer_size).
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<SrmDocument, DocumentError> {
        let path = path.as_ref();
        debug!(
            "Opening {} with a {} byte buffer",
            path.display(),
            self.config().buffer_size
        );
        let file = File::open(path)?;
        self.read(BufReader::with_capacity(self.config().buffer_size, file))
    }
}
