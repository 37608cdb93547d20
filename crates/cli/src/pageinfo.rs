//! pageinfo - report page geometry, rotation and resources of a PDF.
//!
//! Prints one block per page with every box the page carries or
//! inherits. `--content N` dumps page N's decoded content stream bytes
//! instead; `--json` switches the report to JSON.

use clap::{ArgAction, Parser};
use pageport_core::error::Result;
use pageport_core::model::geometry::{PageBox, PageBoxes};
use pageport_core::model::objects::Value;
use pageport_core::{PDFDocument, PdfError};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// A command line tool for inspecting pages of existing PDF files.
#[derive(Parser, Debug)]
#[command(name = "pageinfo")]
#[command(author, version, about = "Report page geometry and content of a PDF", long_about = None)]
struct Args {
    /// Path to a PDF file
    file: PathBuf,

    /// Page numbers to report (1-indexed); all pages when omitted
    #[arg(short = 'p', long = "pages", value_delimiter = ',')]
    pages: Option<Vec<usize>>,

    /// Scale factor dividing user-space points (e.g. 2.8346 for mm)
    #[arg(short = 'k', long = "scale", default_value_t = 1.0)]
    scale: f64,

    /// Dump the decoded content stream of one page and nothing else
    #[arg(short = 'c', long = "content")]
    content: Option<usize>,

    /// Emit JSON instead of plain text
    #[arg(short = 'J', long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

fn box_json(page_box: &PageBox) -> serde_json::Value {
    json!({
        "origin": [page_box.origin.x, page_box.origin.y],
        "size": [page_box.size.width, page_box.size.height],
        "lower_left": [page_box.lower_left.x, page_box.lower_left.y],
        "upper_right": [page_box.upper_right.x, page_box.upper_right.y],
    })
}

fn resource_names(resources: &[Value]) -> Vec<String> {
    let mut names: Vec<String> = resources
        .iter()
        .filter_map(|value| value.as_dict().ok())
        .flat_map(|dict| dict.keys().cloned())
        .collect();
    names.sort();
    names
}

fn report_page<W: Write + ?Sized>(
    out: &mut W,
    doc: &mut PDFDocument<File>,
    page: usize,
    scale: f64,
) -> Result<()> {
    let boxes = doc.get_page_boxes(page, scale)?;
    let rotation = doc.get_page_rotation(page)?;
    let resources = doc.get_page_resources(page)?;

    writeln!(out, "page {page}")?;
    if let Some(degrees) = rotation {
        writeln!(out, "  rotation: {degrees}")?;
    }
    let mut named: Vec<(&str, &PageBox)> = boxes.iter().collect();
    named.sort_by_key(|(name, _)| *name);
    for (name, page_box) in named {
        writeln!(
            out,
            "  {name}: [{} {} {} {}]",
            page_box.lower_left.x,
            page_box.lower_left.y,
            page_box.upper_right.x,
            page_box.upper_right.y
        )?;
    }
    let names = resource_names(&resources);
    if !names.is_empty() {
        writeln!(out, "  resources: {}", names.join(" "))?;
    }
    Ok(())
}

fn page_json(doc: &mut PDFDocument<File>, page: usize, scale: f64) -> Result<serde_json::Value> {
    let boxes: PageBoxes = doc.get_page_boxes(page, scale)?;
    let rotation = doc.get_page_rotation(page)?;
    let resources = doc.get_page_resources(page)?;

    let mut box_map = serde_json::Map::new();
    for (name, page_box) in boxes.iter() {
        box_map.insert(name.to_string(), box_json(page_box));
    }
    Ok(json!({
        "page": page,
        "rotation": rotation,
        "boxes": box_map,
        "resources": resource_names(&resources),
    }))
}

fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    let mut doc = PDFDocument::new(File::open(&args.file)?)?;

    if let Some(page) = args.content {
        let content = doc.get_page_content(page)?;
        out.write_all(&content)?;
        return Ok(());
    }

    let pages: Vec<usize> = match &args.pages {
        Some(selected) => selected.clone(),
        None => (1..=doc.page_count()).collect(),
    };

    if args.json {
        let mut reports = Vec::with_capacity(pages.len());
        for page in &pages {
            reports.push(page_json(&mut doc, *page, args.scale)?);
        }
        let report = json!({
            "file": args.file.display().to_string(),
            "version": doc.version(),
            "page_count": doc.page_count(),
            "pages": reports,
        });
        writeln!(out, "{report:#}")?;
        return Ok(());
    }

    writeln!(out, "{} (PDF {})", args.file.display(), doc.version())?;
    writeln!(out, "pages: {}", doc.page_count())?;
    for page in &pages {
        report_page(out, &mut doc, *page, args.scale)?;
    }
    Ok(())
}

fn main() -> core::result::Result<(), Box<dyn core::error::Error>> {
    let args = Args::parse();

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&args.outfile)?))
    };

    match run(&args, &mut output) {
        Ok(()) => {}
        Err(PdfError::Encrypted) => {
            eprintln!("Error: {} is encrypted", args.file.display());
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }

    output.flush()?;
    Ok(())
}
