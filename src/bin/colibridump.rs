/*
** This file is a part of Colibri (stanza decoder for Jitsi Videobridge)
**
** Colibri is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::env;
use std::fs::File;
use std::io::stdin;
use std::io::Read;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use colibri::ColibriDecoder;
use colibri::ColibriError;
use colibri::Conference;
use colibri::Decoded;
use colibri::SkipMode;
use colibri::Transport;
use colibri::VERSION;

fn print_version() {
    println!("colibridump (colibri) v{}", VERSION);
}

fn print_usage() {
    println!(concat!(
        "Usage: colibridump [OPTIONS] [FILE.xml...]\n",
        "This tool decodes Colibri conference stanzas and prints them back.\n",
        "Options:\n",
        "  -s, --summary      Print a channel summary instead of the stanza\n",
        "  -l, --legacy-skip  Skip unknown elements up to the first end tag with the same name\n",
        "  -d, --debug        Log decoder activity to stderr (RUST_LOG is used otherwise)\n",
        "  -h, --help         Display this help message and exit\n",
        "  -v, --version      Display the version and exit"
    ));
}

fn print_summary(conference: &Conference) {
    println!("conference {}", conference.id().unwrap_or("-"));
    for content in conference.contents() {
        println!("  content {}", content.name().unwrap_or("-"));
        for channel in content.channels() {
            print!("    channel {}", channel.id().unwrap_or("-"));
            if let Some(port) = channel.rtp_port() {
                print!(" rtp-port={}", port);
            }
            if let Some(direction) = channel.direction() {
                print!(" direction={}", direction);
            }
            if let Some(expire) = channel.expire() {
                print!(" expire={}", expire);
            }
            println!();
            for payload_type in channel.payload_types() {
                println!(
                    "      payload-type {} {}/{}",
                    payload_type.name.as_deref().unwrap_or("-"),
                    payload_type.clockrate.unwrap_or(0),
                    payload_type.channels
                );
            }
            match channel.transport() {
                Some(Transport::IceUdp(ice)) => {
                    println!("      transport ice-udp, {} candidates", ice.candidates.len())
                }
                Some(Transport::RawUdp(raw)) => {
                    println!("      transport raw-udp, {} candidates", raw.candidates.len())
                }
                None => (),
            }
            for ssrc in channel.ssrcs() {
                println!("      ssrc {}", ssrc);
            }
        }
    }
}

enum DumpError {
    IoError(std::io::Error),
    Decode(ColibriError),
    NotApplicable,
}

impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::IoError(err)
    }
}

impl From<ColibriError> for DumpError {
    fn from(err: ColibriError) -> Self {
        DumpError::Decode(err)
    }
}

struct Dumper {
    decoder: ColibriDecoder,
    summary: bool,
}

impl Dumper {
    fn decode_file(&self, file: &str, is_stream: bool) -> Result<Conference, DumpError> {
        let mut f: Box<dyn Read> = if is_stream {
            Box::new(stdin())
        } else {
            Box::new(File::open(file)?)
        };
        let mut buffer = Vec::new();
        f.read_to_end(&mut buffer)?;
        match self.decoder.decode_bytes(&buffer)? {
            Decoded::Conference(conference) => Ok(conference),
            Decoded::NotApplicable => Err(DumpError::NotApplicable),
        }
    }

    fn dump_file(&self, file: &str, is_stream: bool) -> bool {
        match self.decode_file(file, is_stream) {
            Ok(conference) => {
                if self.summary {
                    print_summary(&conference);
                } else {
                    println!("{}", conference);
                }
                true
            }
            Err(DumpError::IoError(e)) => {
                eprintln!("Error reading file '{}': {}", file, e);
                false
            }
            Err(DumpError::Decode(e)) => {
                eprintln!("Cannot decode '{}': {}", file, e);
                false
            }
            Err(DumpError::NotApplicable) => {
                eprintln!("File '{}' does not hold a Colibri conference", file);
                false
            }
        }
    }
}

fn main() -> ExitCode {
    let mut args = env::args();

    let mut files = Vec::new();
    let mut summary = false;
    let mut debug = false;
    let mut skip_mode = SkipMode::DepthCounted;

    // Skip the first argument (program name)
    args.next();
    for arg in args {
        match arg.as_str() {
            "-s" | "--summary" => {
                summary = true;
            }
            "-l" | "--legacy-skip" => {
                skip_mode = SkipMode::NameMatched;
            }
            "-d" | "--debug" => {
                debug = true;
            }
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => {
                files.push(arg);
            }
        }
    }

    let filter = if debug {
        EnvFilter::new("colibri=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dumper = Dumper {
        decoder: ColibriDecoder::builder().skip_mode(skip_mode).build(),
        summary,
    };
    if files.is_empty() {
        if !dumper.dump_file("stdin", true) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in files {
            if !dumper.dump_file(&file, false) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
