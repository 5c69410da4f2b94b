use pngkit::{png::*, IoSink, IoSource, SliceSource};

use std::{fs::File, io::BufReader, path::Path, process::ExitCode};

const USAGE: &str = "usage:
  pngkit info <file.png>...
  pngkit chunks <file.png>
  pngkit reencode <in.png> <out.png>";

fn main() -> ExitCode {
  let args: Vec<String> = std::env::args().skip(1).collect();
  let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
    ["info", paths @ ..] if !paths.is_empty() => info_all(paths),
    ["chunks", path] => chunks(path),
    ["reencode", input, output] => reencode(input, output),
    _ => {
      eprintln!("{USAGE}");
      return ExitCode::FAILURE;
    }
  };
  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(msg) => {
      eprintln!("{msg}");
      ExitCode::FAILURE
    }
  }
}

fn open<P: AsRef<Path>>(path: P) -> Result<IoSource<BufReader<File>>, String> {
  let path = path.as_ref();
  File::open(path)
    .map(|f| IoSource::new(BufReader::new(f)))
    .map_err(|e| format!("{}: {e}", path.display()))
}

fn info(path: &str) -> Result<(), String> {
  match decode_info(open(path)?) {
    Ok(ImageInfo { width, height, format, color_type, bit_depth, is_interlaced }) => {
      println!(
        "{path}: {width}x{height} {color_type:?} {bit_depth}-bit, decodes as {format:?}{}",
        if is_interlaced { ", interlaced" } else { "" }
      );
      Ok(())
    }
    Err(e) => Err(format!("{path}: {e}")),
  }
}

/// Reports on every path, printing each failure as it happens.
fn info_all(paths: &[&str]) -> Result<(), String> {
  let failed = paths.iter().filter(|p| info(p).map_err(|msg| eprintln!("{msg}")).is_err()).count();
  match failed {
    0 => Ok(()),
    n => Err(format!("{n} of {} files failed", paths.len())),
  }
}

fn chunks(path: &str) -> Result<(), String> {
  let bytes = std::fs::read(path).map_err(|e| format!("{path}: {e}"))?;
  for chunk in ChunkReader::new(SliceSource::new(&bytes)) {
    let chunk = chunk.map_err(|e| format!("{path}: {e}"))?;
    let crc = if chunk.verify_crc().is_ok() { "ok" } else { "BAD" };
    println!("{:?} len={} crc={:08X} ({crc})", chunk.chunk_type, chunk.data.len(), chunk.declared_crc);
  }
  Ok(())
}

fn reencode(input: &str, output: &str) -> Result<(), String> {
  let image = decode(open(input)?).map_err(|e| format!("{input}: {e}"))?;
  let file = File::create(output).map_err(|e| format!("{output}: {e}"))?;
  encode(&image.pixels, image.width, image.height, image.format, IoSink::new(file))
    .map_err(|e| format!("{output}: {e}"))?;
  println!("{input} -> {output}: {}x{}", image.width, image.height);
  Ok(())
}

#[test]
fn test_info_all_reports_every_failure() {
  let missing = ["/nonexistent/a.png", "/nonexistent/b.png"];
  assert_eq!(info_all(&missing), Err(String::from("2 of 2 files failed")));
}
