use binmap::store::{self, OpenMode};
use binmap::{share, Bit, ByteBitfield, ByteOrder, Kind, Options, Reader, Writer};
use clap::{Parser, Subcommand};
use std::io::{Read, Seek, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "binmap", about = "Inspect and patch binary files at fixed offsets")]
struct Cli {
    /// JSON options file (byte_order, open_mode)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hex dump a range of a file
    Dump {
        input: PathBuf,
        #[arg(short, long, default_value = "0")]
        offset: u64,
        /// Bytes to show (default: to end of file)
        #[arg(short, long)]
        length: Option<u64>,
    },
    /// Read one value at an offset
    Peek {
        input: PathBuf,
        #[arg(short, long)]
        offset: u64,
        /// u8 i8 char bool i16 u16 i32 u32 i64 u64 f32 f64 cstr str
        #[arg(short, long, default_value = "u8")]
        kind: String,
        /// be | le (overrides the config file)
        #[arg(long)]
        order: Option<String>,
        /// Field width for cstr (optional) and str (required)
        #[arg(short, long)]
        width: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Write one value at an offset, in place
    Poke {
        input: PathBuf,
        #[arg(short, long)]
        offset: u64,
        #[arg(short, long, default_value = "u8")]
        kind: String,
        #[arg(short, long)]
        value: String,
        #[arg(long)]
        order: Option<String>,
        /// Fixed field width for cstr / str
        #[arg(short, long)]
        width: Option<usize>,
        /// Allow starting a new file; the config's open_mode then applies
        #[arg(long)]
        create: bool,
    },
    /// Show or change one flag bit of a byte
    Bit {
        input: PathBuf,
        #[arg(short, long)]
        offset: u64,
        /// 0 (least significant) through 7
        #[arg(short, long)]
        bit: u8,
        #[arg(long)]
        set: Option<bool>,
    },
}

/// What `peek` / `poke` operate on.
enum Field {
    Scalar(Kind),
    CString,
    Str,
}

impl Field {
    fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cstr" | "cstring" => Some(Field::CString),
            "str" | "string"   => Some(Field::Str),
            other              => Kind::from_name(other).map(Field::Scalar),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let options = match &cli.config {
        Some(path) => Options::load(path)?,
        None       => Options::default(),
    };

    match cli.command {

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { input, offset, length } => {
            let mut reader = Reader::open(&input, options.byte_order)?;
            let len = reader.len()?;
            let start = offset.min(len);
            let count = length.unwrap_or(len - start).min(len - start);
            reader.seek(start)?;
            let bytes = reader.read_bytes(count as usize)?;
            for (i, line) in bytes.chunks(16).enumerate() {
                let hex_cols: Vec<String> = line.iter().map(|b| hex::encode([*b])).collect();
                let ascii: String = line
                    .iter()
                    .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                    .collect();
                println!("{:08x}  {:<47}  {}", start + (i * 16) as u64, hex_cols.join(" "), ascii);
            }
        }

        // ── Peek ─────────────────────────────────────────────────────────────
        Commands::Peek { input, offset, kind, order, width, json } => {
            let field = parse_field(&kind)?;
            let order = resolve_order(order.as_deref(), &options)?;
            let mut reader = Reader::open(&input, order)?;
            reader.seek(offset)?;
            let rendered = match field {
                Field::Scalar(kind) => {
                    let value = reader.read_value(kind)?;
                    if json {
                        serde_json::json!({ "offset": offset, "kind": kind.name(), "value": value })
                    } else {
                        serde_json::Value::String(value.to_string())
                    }
                }
                Field::CString => {
                    let text = match width {
                        Some(w) => reader.read_cstring_fixed(w)?,
                        None    => reader.read_cstring()?,
                    };
                    string_result(json, offset, "cstr", text)
                }
                Field::Str => {
                    let w = width.ok_or("str needs --width")?;
                    let text = reader.read_unterminated_string(w)?;
                    string_result(json, offset, "str", text)
                }
            };
            match rendered {
                serde_json::Value::String(s) if !json => println!("{s}"),
                other => println!("{}", serde_json::to_string_pretty(&other)?),
            }
        }

        // ── Poke ─────────────────────────────────────────────────────────────
        Commands::Poke { input, offset, kind, value, order, width, create } => {
            let field = parse_field(&kind)?;
            let order = resolve_order(order.as_deref(), &options)?;
            let mode = if create { options.open_mode } else { OpenMode::Existing };
            let mut writer = Writer::open(&input, mode, order)?;
            match field {
                Field::Scalar(kind) => writer.write_at(offset, kind.parse(&value)?)?,
                Field::CString => {
                    writer.seek(offset)?;
                    writer.write_cstring(&value, width)?;
                }
                Field::Str => {
                    writer.seek(offset)?;
                    writer.write_unterminated_string(&value, width)?;
                }
            }
            writer.flush()?;
            println!("wrote {} at {:#x} in {}", kind, offset, input.display());
        }

        // ── Bit ──────────────────────────────────────────────────────────────
        Commands::Bit { input, offset, bit, set } => {
            let bit = Bit::from_index(bit).ok_or("bit must be 0..=7")?;
            match set {
                Some(on) => {
                    let file = store::open_for_write(&input, OpenMode::Existing)?;
                    let writer = share(file, options.byte_order);
                    let flags = ByteBitfield::new(&writer, offset);
                    flags.set(bit, on)?;
                    writer.borrow_mut().flush()?;
                    print_bit(&flags, bit)?;
                }
                None => {
                    let writer = share(store::load(&input)?, options.byte_order);
                    print_bit(&ByteBitfield::new(&writer, offset), bit)?;
                }
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_field(s: &str) -> Result<Field, Box<dyn std::error::Error>> {
    Field::from_name(s).ok_or_else(|| format!("unknown kind '{s}'").into())
}

fn resolve_order(flag: Option<&str>, options: &Options) -> Result<ByteOrder, Box<dyn std::error::Error>> {
    match flag {
        Some(name) => ByteOrder::from_name(name).ok_or_else(|| format!("unknown byte order '{name}'").into()),
        None       => Ok(options.byte_order),
    }
}

fn print_bit<S: Read + Write + Seek>(flags: &ByteBitfield<S>, bit: Bit) -> binmap::Result<()> {
    println!("{:#x}: {}  bit {:#04x} = {}", flags.offset(), flags.describe()?, bit.mask(), flags.get(bit)?);
    Ok(())
}

fn string_result(json: bool, offset: u64, kind: &str, text: String) -> serde_json::Value {
    if json {
        serde_json::json!({ "offset": offset, "kind": kind, "value": text })
    } else {
        serde_json::Value::String(text)
    }
}
