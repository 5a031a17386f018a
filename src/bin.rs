use std::fs::File;

use anyhow::Context;
use clap::Parser;
use iff::iff::{read_header_at, ChunkEntry, ChunkWalker, HEADER_SIZE};
use memmap2::Mmap;

#[derive(Parser, Debug)]
#[command(about)]
/// List the chunks of an IFF-style container
struct Args {
    /// Input file path
    path_str: String,

    /// Step over the padding byte after odd-sized payloads (RIFF convention)
    #[arg(long)]
    padded: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let file = File::open(&args.path_str)
        .with_context(|| format!("can't open `{}`", args.path_str))?;
    // Safety: mapped read-only; the file must not be truncated while mapped.
    let map = unsafe { Mmap::map(&file) }
        .with_context(|| format!("can't map `{}`", args.path_str))?;
    let buf: &[u8] = &map;

    log::debug!("mapped {} bytes from `{}`", buf.len(), args.path_str);

    let form = read_header_at(buf, 0)
        .with_context(|| format!("`{}` has no top-level header", args.path_str))?;
    print_header(
        &ChunkEntry {
            index: 0,
            offset: 0,
            header: form,
        },
        0,
    );

    let mut walker = ChunkWalker::new(buf, HEADER_SIZE, buf.len());
    if args.padded {
        walker = walker.padded();
    }
    for entry in walker {
        let entry = entry.with_context(|| format!("`{}` is malformed", args.path_str))?;
        print_header(&entry, 1);
    }

    Ok(())
}

fn print_header(entry: &ChunkEntry, tabs: usize) {
    println!(
        "{}[{:02}] 0x{:08X}: {} size=0x{:08X}",
        "\t".repeat(tabs),
        entry.index,
        entry.offset,
        entry.header.tag_string(),
        entry.header.size,
    );
}
