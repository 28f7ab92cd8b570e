use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use domcolor::{Image, Options, PixelFormat, QuantizeResult, SwatchStrip};

const TILE_SIZE: usize = 64;

fn load_image(path: &str) -> Result<(Vec<u8>, usize, usize, PixelFormat), Box<dyn std::error::Error>> {
    let mut decoder = png::Decoder::new(File::open(path)?);
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let format = match info.color_type {
        png::ColorType::Rgb => PixelFormat::Rgb,
        png::ColorType::Rgba => PixelFormat::Rgba,
        other => return Err(format!("Unsupported PNG color type: {:?}", other).into()),
    };

    buf.truncate(info.buffer_size());

    Ok((buf, info.width as usize, info.height as usize, format))
}

fn save_swatches(path: &str, strip: &SwatchStrip) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(Path::new(path))?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, strip.width as u32, strip.height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    writer.write_image_data(&strip.data)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        println!("Usage: domcolor_demo <colors> <src_path> <swatch_path>");
        std::process::exit(1)
    }

    let colors = args[1].parse::<u32>()?;
    let src_path = &args[2];
    let dst_path = &args[3];

    let (bytes, width, height, format) = load_image(src_path)?;

    let image = Image::with_format(bytes.as_slice(), width, height, format)?;

    let mut opts = Options::default();
    opts.set_max_colors(colors)?;

    let result = QuantizeResult::quantize(&image, &opts)?;
    let palette = result.get_palette();

    for c in palette {
        println!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b);
    }
    if let (Some(dark), Some(avg)) = (palette.darkest(), palette.average()) {
        println!("dark: {:?}, average: {:?}", dark.as_array(), avg.as_array());
    }
    println!("error: {:.6}", result.get_error());

    save_swatches(dst_path, &palette.swatch_strip(TILE_SIZE))
}
