mod config;
mod hexdump;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use benix_ext2::{BlockDevice, ImageOrigin, ListingEntry, StreamImage, Volume};
use log::{debug, info};

use crate::config::{DEFAULT_IMAGE_PATH, DEFAULT_ORIGIN, DEMO_DIR, DEMO_FILE};
use crate::hexdump::hex_dump;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// List the root, read the demo file, list the demo directory.
    Demo,
    Info,
    Ls(Option<String>),
    Cat(String),
    Dump(String),
    Inode(u32),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    image: PathBuf,
    origin: ImageOrigin,
    command: Command,
}

fn main() {
    env_logger::init();

    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_args(env::args().skip(1))?;
    if options.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let image = StreamImage::open(&options.image, options.origin)
        .with_context(|| format!("failed to open image {}", options.image.display()))?;
    debug!(
        "image {}: {} bytes, origin {:?}",
        options.image.display(),
        image.len(),
        options.origin
    );
    let volume = Volume::mount(image)
        .with_context(|| format!("failed to mount {}", options.image.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match options.command {
        Command::Demo => demo(&volume, &mut out),
        Command::Info => info_cmd(&volume, &mut out),
        Command::Ls(None) => print_listing(&mut out, &volume.list_root()?),
        Command::Ls(Some(name)) => {
            let rows = volume
                .list_dir(&name)
                .with_context(|| format!("failed to list {name}"))?;
            print_listing(&mut out, &rows)
        }
        Command::Cat(name) => cat(&volume, &name, &mut out),
        Command::Dump(name) => dump(&volume, &name, &mut out),
        Command::Inode(ino) => inode_cmd(&volume, ino, &mut out),
        Command::Help => Ok(()),
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut image = PathBuf::from(DEFAULT_IMAGE_PATH);
    let mut origin = DEFAULT_ORIGIN;
    let mut rest = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--image" | "-i" => {
                let Some(path) = args.next() else {
                    bail!("--image needs a path");
                };
                image = PathBuf::from(path);
            }
            "--disk" => origin = ImageOrigin::Disk,
            "--volume" => origin = ImageOrigin::Volume,
            "--offset" => {
                let Some(value) = args.next() else {
                    bail!("--offset needs a byte count");
                };
                let offset = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid offset: {value}"))?;
                origin = ImageOrigin::Offset(offset);
            }
            "--help" | "-h" => {
                rest.clear();
                rest.push("help".to_owned());
                break;
            }
            _ => rest.push(arg),
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None => Command::Demo,
        Some("help") => Command::Help,
        Some("info") => Command::Info,
        Some("ls") => Command::Ls(rest.next()),
        Some("cat") => Command::Cat(required(rest.next(), "cat")?),
        Some("dump") => Command::Dump(required(rest.next(), "dump")?),
        Some("inode") => {
            let value = required(rest.next(), "inode")?;
            let ino = value
                .parse::<u32>()
                .with_context(|| format!("invalid inode number: {value}"))?;
            Command::Inode(ino)
        }
        Some(other) => bail!("unknown command: {other}"),
    };

    if let Some(extra) = rest.next() {
        bail!("unexpected argument: {extra}");
    }

    Ok(Options {
        image,
        origin,
        command,
    })
}

fn required(value: Option<String>, command: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => bail!("{command} needs a name"),
    }
}

fn print_usage() {
    println!("Usage: benix [--image PATH] [--disk|--volume|--offset BYTES] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  info        super block and group descriptors");
    println!("  ls [NAME]   list the root, or the root-level directory NAME");
    println!("  cat NAME    write a root-level file to stdout");
    println!("  dump NAME   hex dump of a root-level file's blocks");
    println!("  inode N     decoded fields of inode N");
    println!();
    println!("Without a command: ls, cat {DEMO_FILE}, ls {DEMO_DIR}.");
    println!("Default image: {DEFAULT_IMAGE_PATH} (disk layout).");
}

fn print_listing(out: &mut impl Write, rows: &[ListingEntry]) -> Result<()> {
    for row in rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}

fn demo<D: BlockDevice>(volume: &Volume<D>, out: &mut impl Write) -> Result<()> {
    print_listing(out, &volume.list_root()?)?;

    let file = volume
        .open_file(DEMO_FILE)
        .with_context(|| format!("failed to read {DEMO_FILE}"))?;
    info!("{}: {} bytes in {} block(s)", DEMO_FILE, file.size(), file.blocks().len());
    out.write_all(&file.contents())?;
    writeln!(out)?;

    let rows = volume
        .list_dir(DEMO_DIR)
        .with_context(|| format!("failed to list {DEMO_DIR}"))?;
    print_listing(out, &rows)
}

fn info_cmd<D: BlockDevice>(volume: &Volume<D>, out: &mut impl Write) -> Result<()> {
    let sb = volume.super_block();
    writeln!(out, "Volume label:      {:?}", sb.volume_label_trimmed())?;
    writeln!(out, "Inodes:            {} ({} free)", sb.s_inodes_count, sb.s_free_inodes_count)?;
    writeln!(out, "Blocks:            {} ({} free)", sb.s_blocks_count, sb.s_free_blocks_count)?;
    writeln!(out, "Volume size:       {} bytes", sb.volume_size())?;
    writeln!(out, "First data block:  {}", sb.s_first_data_block)?;
    writeln!(out, "Blocks per group:  {}", sb.s_blocks_per_group)?;
    writeln!(out, "Inodes per group:  {}", sb.s_inodes_per_group)?;
    writeln!(out, "Inode size:        {}", sb.inode_size())?;
    writeln!(out, "Revision:          {}", sb.s_rev_level)?;
    writeln!(out, "Block groups:      {}", volume.group_count())?;

    for (group, desc) in volume.groups().iter().enumerate() {
        writeln!(
            out,
            "Group {group}: block bitmap {}, inode bitmap {}, inode table {}, free blocks {}, free inodes {}, dirs {}",
            desc.bg_block_bitmap,
            desc.bg_inode_bitmap,
            desc.bg_inode_table,
            desc.bg_free_blocks_count,
            desc.bg_free_inodes_count,
            desc.bg_used_dirs_count
        )?;
    }
    Ok(())
}

fn cat<D: BlockDevice>(volume: &Volume<D>, name: &str, out: &mut impl Write) -> Result<()> {
    let file = volume
        .open_file(name)
        .with_context(|| format!("failed to read {name}"))?;
    out.write_all(&file.contents())?;
    Ok(())
}

fn dump<D: BlockDevice>(volume: &Volume<D>, name: &str, out: &mut impl Write) -> Result<()> {
    let blocks = volume
        .get_file(name)
        .with_context(|| format!("failed to read {name}"))?;
    for block in &blocks {
        writeln!(out, "block {}", block.number())?;
        for line in hex_dump(block.as_bytes()) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn inode_cmd<D: BlockDevice>(volume: &Volume<D>, ino: u32, out: &mut impl Write) -> Result<()> {
    let group = volume.inode_group(ino)?;
    let location = volume.inode_table(group)?.locate(ino)?;
    let inode = volume
        .inode(ino)
        .with_context(|| format!("failed to read inode {ino}"))?;

    writeln!(out, "Inode {ino} (group {group}, block {}, offset {})", location.block, location.byte_offset)?;
    writeln!(out, "Type:        {:?}", inode.file_type())?;
    writeln!(out, "Mode:        {:o}", inode.permissions())?;
    writeln!(out, "Owner:       uid {} gid {}", inode.i_uid, inode.i_gid)?;
    writeln!(out, "Size:        {}", inode.size())?;
    writeln!(out, "Links:       {}", inode.i_links_count)?;
    writeln!(out, "Sectors:     {}", inode.i_blocks)?;
    writeln!(out, "Accessed:    {}", inode.i_atime)?;
    writeln!(out, "Changed:     {}", inode.i_ctime)?;
    writeln!(out, "Modified:    {}", inode.i_mtime)?;
    match inode.deletion_time() {
        Some(t) => writeln!(out, "Deleted:     {t}")?,
        None => writeln!(out, "Deleted:     no")?,
    }
    writeln!(out, "Flags:       {:#x}", inode.i_flags)?;
    for (i, ptr) in inode.i_block.iter().enumerate() {
        writeln!(out, "Block {i:>2}:    {ptr}")?;
    }
    writeln!(out, "Indirect:    {}", inode.i_indirect)?;
    writeln!(out, "Double ind.: {}", inode.i_double_indirect)?;
    writeln!(out, "Triple ind.: {}", inode.i_triple_indirect)?;
    Ok(())
}
