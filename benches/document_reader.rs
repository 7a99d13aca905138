use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use srmdoc::reader::DocumentReader;

const SEQUENCES: [&str; 4] = ["PEPTIDEKR", "ELVISLIVESK", "AGSPTLLDEK", "VLSEAGLNPTQR"];

/// Build a document with `peptides` peptides, two precursors each and
/// results in `replicates` replicates
fn create_document(peptides: usize, replicates: usize) -> String {
    let mut xml = String::from(r#"<srm_settings format_version="4.12"><settings_summary><measured_results>"#);
    for r in 0..replicates {
        xml.push_str(&format!(
            r#"<replicate name="R{r}"><sample_file id="f{r}" file_path="run{r}.raw"/></replicate>"#
        ));
    }
    xml.push_str(r#"</measured_results></settings_summary><peptide_list label_name="bench">"#);
    for i in 0..peptides {
        let sequence = SEQUENCES[i % SEQUENCES.len()];
        xml.push_str(&format!(r#"<peptide sequence="{sequence}">"#));
        for charge in 2..=3 {
            xml.push_str(&format!(r#"<precursor charge="{charge}">"#));
            for ordinal in 3..7 {
                xml.push_str(&format!(
                    r#"<transition fragment_type="y" fragment_ordinal="{ordinal}" product_charge="1"><transition_results>"#
                ));
                for r in 0..replicates {
                    xml.push_str(&format!(
                        r#"<transition_peak replicate="R{r}" file="f{r}" retention_time="{rt}" start_time="{start}" end_time="{end}" area="{area}" background="12" height="800" fwhm="0.15" rank="{rank}"/>"#,
                        rt = 10.0 + i as f64 * 0.1,
                        start = 9.8 + i as f64 * 0.1,
                        end = 10.3 + i as f64 * 0.1,
                        area = 1000 + ordinal * 100 + r,
                        rank = 7 - ordinal,
                    ));
                }
                xml.push_str("</transition_results></transition>");
            }
            xml.push_str("</precursor>");
        }
        xml.push_str("</peptide>");
    }
    xml.push_str("</peptide_list></srm_settings>");
    xml
}

/// Benchmark reading documents of increasing size
fn bench_read_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_document");
    let reader = DocumentReader::new();

    for peptides in [100, 500, 2000] {
        let xml = create_document(peptides, 4);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(peptides), &xml, |b, xml| {
            b.iter(|| {
                let document = reader.read_str(black_box(xml)).unwrap();
                black_box(document.counts())
            })
        });
    }

    group.finish();
}

/// Benchmark the cost of results correlation by replicate count
fn bench_replicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicates");
    let reader = DocumentReader::new();

    for replicates in [1, 8, 32] {
        let xml = create_document(200, replicates);
        group.bench_with_input(BenchmarkId::from_parameter(replicates), &xml, |b, xml| {
            b.iter(|| black_box(reader.read_str(black_box(xml)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_document, bench_replicates);
criterion_main!(benches);
