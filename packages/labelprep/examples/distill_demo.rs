use anyhow::Result;
use labelprep::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Stage a tiny one-image export next to a matching vocabulary
    let dir = tempfile::tempdir()?;
    let export_path = dir.path().join("export.json");
    let labels_path = dir.path().join("labels.yml");
    let output_path = dir.path().join("layoutlm-annotations.json");

    std::fs::write(&labels_path, "labels:\n  - other\n  - header\n  - total\n")?;
    std::fs::write(
        &export_path,
        r#"[{
            "ocr": "http://localhost:9000/images/invoice%20march.png",
            "bbox": [
                {"x": 8.5, "y": 4.0, "width": 31.0, "height": 3.5},
                {"x": 62.0, "y": 88.25, "width": 20.5, "height": 3.0}
            ],
            "transcription": ["ACME Corp Invoice", "Total: $1,024.00"],
            "label": [{"labels": ["header"]}, {"labels": ["total"]}]
        }]"#,
    )?;

    // Distill the export into layout-model records
    let distiller = Distiller::new(DistillerOptions {
        input_path: export_path,
        output_path: output_path.clone(),
        labels_path,
        image_root: "/images".to_string(),
    });
    let result = distiller.distill().await?;

    println!("Distilled {} record(s), {} region(s)", result.records, result.regions);
    println!("{}", "=".repeat(60));
    println!("{}", std::fs::read_to_string(&output_path)?);

    Ok(())
}
