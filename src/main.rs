use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use topdf::convert::{ConvertOptions, Converter, LogProgress, Session};
use topdf::layout::Margins;
use topdf::pagesize::{PageOrientation, PageSize};
use topdf::{Error, Font, PdfFont, Pt};

/// Convert a document, text file, HTML page or image into a paginated PDF
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// The file to convert (.docx, .txt, .html or an image)
    input: PathBuf,

    /// Where to write the PDF. Defaults to the input with a .pdf extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Paper size, e.g. a4, letter, legal
    #[arg(long, default_value = "a4", value_parser = parse_page_size)]
    page_size: PageSize,

    #[arg(long)]
    landscape: bool,

    /// Margin on every side, in points
    #[arg(long, default_value_t = 40.0)]
    margin: f32,

    /// Font size for text, in points
    #[arg(long, default_value_t = 12.0)]
    font_size: f32,

    /// Distance between lines of text, in points. Defaults to 1.15 times the font size
    /// for Courier, or the line spacing of the font given with `--font`
    #[arg(long)]
    line_height: Option<f32>,

    /// A TrueType or OpenType font to draw text with instead of Courier
    #[arg(long)]
    font: Option<PathBuf>,

    /// Document title. Defaults to the input file name
    #[arg(long)]
    title: Option<String>,
}

fn parse_page_size(name: &str) -> Result<PageSize, String> {
    PageSize::from_name(name).ok_or_else(|| format!("unknown page size `{name}`"))
}

fn options(cli: &Cli) -> Result<ConvertOptions, Error> {
    let mut options = ConvertOptions::new();

    let page_size = if cli.landscape {
        cli.page_size.landscape()
    } else {
        cli.page_size
    };
    options
        .page_size(page_size)
        .margins(Margins::all(Pt(cli.margin)))
        .font_size(Pt(cli.font_size));

    if let Some(line_height) = cli.line_height {
        options.line_height(Pt(line_height));
    }
    if let Some(path) = &cli.font {
        let font = Font::load(std::fs::read(path)?)?;
        options.font(PdfFont::from(font));
    }
    if let Some(title) = &cli.title {
        options.title(title);
    }

    Ok(options)
}

fn run(cli: Cli) -> Result<(), Error> {
    let converter = Converter::new(options(&cli)?);
    let mut session = Session::open(&cli.input)?;

    let pdf = converter.convert(&mut session, &mut LogProgress)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    std::fs::write(&output, pdf)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
