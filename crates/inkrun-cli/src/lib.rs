//! Command-line interface for inkrun
//!
//! The binary in `main.rs` parses [`cli::Cli`] and hands it to [`run`].

pub mod cli;
pub mod dump;

use inkrun::export::PgmExporter;
use inkrun::fontdb::SystemFontResolver;
use inkrun::{RenderRequest, Result};

use cli::Cli;

/// Request described by the command line
pub fn request_from(cli: &Cli) -> RenderRequest {
    RenderRequest::new(cli.text.as_str())
        .font_query(cli.font.as_str())
        .pixel_size(cli.size)
        .padding(cli.padding)
        .canvas_size(cli.canvas)
}

/// Font search described by the command line
pub fn resolver_from(cli: &Cli) -> SystemFontResolver {
    let mut resolver = SystemFontResolver::new();
    if cli.no_system_fonts {
        resolver = resolver.without_system_fonts();
    }
    for dir in &cli.font_dirs {
        resolver = resolver.with_font_dir(dir);
    }
    resolver
}

/// Render (or dump) as the command line asks
pub fn run(cli: &Cli) -> Result<()> {
    let pipeline = inkrun::pipeline_with_resolver(resolver_from(cli))?;
    let request = request_from(cli);

    if cli.dump_glyphs {
        let run = pipeline.shape(&request)?;
        let json = dump::to_json(&request, &run)?;
        println!("{}", json);
        return Ok(());
    }

    let canvas = pipeline.render(&request)?;
    let exporter = if cli.ascii {
        PgmExporter::ascii()
    } else {
        PgmExporter::binary()
    };
    exporter.write_to(&canvas, &cli.output)?;

    if cli.verbose {
        eprintln!(
            "{}x{} -> {}",
            canvas.width(),
            canvas.height(),
            cli.output.display()
        );
    }
    Ok(())
}
