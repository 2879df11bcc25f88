//! Very simple tool that accepts SVG path as an input and produces coverage mask image
#![deny(warnings)]

use polyscan::*;
use std::{
    env,
    fs::File,
    io::{BufWriter, Read},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_file: String,
    output_file: String,
    width: Option<usize>,
    tr: Transform,
    invert: bool,
    options: FillOptions,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            input_file: String::new(),
            output_file: String::new(),
            width: None,
            tr: Transform::identity(),
            invert: false,
            options: FillOptions::default(),
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "rasterize".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-c" => {
                    let config = args.next().ok_or("-c requires argument")?;
                    result.options = serde_json::from_reader(File::open(config)?)?;
                }
                "-w" => {
                    let width = args.next().ok_or("-w requires argument")?;
                    result.width = Some(width.parse()?);
                }
                "-t" => {
                    result.tr = args.next().ok_or("-t requires argument")?.parse()?;
                }
                "-r" => {
                    let rule = args.next().ok_or("-r requires argument")?;
                    result.options.fill_rule = rule.parse()?;
                }
                "-d" => {
                    let depth = args.next().ok_or("-d requires argument")?;
                    result.options.subpixel_depth = depth.parse()?;
                }
                "-j" => {
                    let threads = args.next().ok_or("-j requires argument")?;
                    result.options.threads = threads.parse()?;
                }
                "-a" => {
                    result.options.antialias = false;
                }
                "-i" => {
                    result.invert = true;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.input_file = arg,
                        2 => result.output_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 2 {
            eprintln!(
                "Very simple tool that accepts SVG path as an input and produces coverage mask image"
            );
            eprintln!("\nUSAGE:");
            eprintln!(
                "    {} [-c <config>] [-w <width>] [-t <transform>] [-r <rule>] [-d <depth>] [-j <threads>] [-a] [-i] <file.path> <out.png>",
                cmd
            );
            eprintln!("\nARGS:");
            eprintln!("    -c <config>        JSON file with fill options");
            eprintln!("    -w <width>         width in pixels of the output image");
            eprintln!("    -t <transform>     apply transform");
            eprintln!("    -r <rule>          fill rule `nonzero` or `evenodd`");
            eprintln!(
                "    -d <depth>         sub-pixel lines per pixel (default: {})",
                DEFAULT_SUBPIXEL_DEPTH
            );
            eprintln!("    -j <threads>       number of threads used to scan rows");
            eprintln!("    -a                 disable anti-aliasing");
            eprintln!("    -i                 render dark shape on light background");
            eprintln!("    <file.path>        file containing SVG path ('-' means stdin)");
            eprintln!("    <out.png>          image rendered in the PNG format ('-' means stdout)");
            std::process::exit(1);
        }
        Ok(result)
    }
}

/// Load path for the file
fn path_load(path: String) -> Result<Path, Error> {
    let mut contents = String::new();
    if path != "-" {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    } else {
        std::io::stdin().read_to_string(&mut contents)?;
    }
    Ok(tracing::debug_span!("[parse]").in_scope(|| contents.parse())?)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let mut path = path_load(args.input_file)?;
    tracing::debug!("[path:points_count] {}", path.points_count());
    path.transform(args.tr);
    if path.is_empty() {
        return Err("path is empty".into());
    }

    // scale to requested width
    if let Some(width) = args.width {
        let bbox = path.bbox();
        if bbox.width() > EPSILON {
            let scale = width as Scalar / bbox.width();
            path.transform(Transform::new_scale(scale, scale).translate(-bbox.x(), -bbox.y()));
        }
    }

    let mut mask = tracing::debug_span!("[mask]", options = ?args.options)
        .in_scope(|| path.mask(&args.options));
    if args.invert {
        for value in mask.iter_mut() {
            *value = 1.0 - *value;
        }
    }

    // save
    let _save = tracing::debug_span!("[save]").entered();
    if args.output_file != "-" {
        let image_file = BufWriter::new(File::create(args.output_file)?);
        mask.write_png(image_file)?;
    } else {
        mask.write_png(std::io::stdout())?;
    }

    Ok(())
}
