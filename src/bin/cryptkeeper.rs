//! Cryptkeeper CLI - personal encrypted journal
//!
//! `write` composes a new entry in the user's editor and persists it
//! encrypted; `read` decrypts an existing entry and opens it for viewing.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use cryptkeeper::editor::PreferredEditorResolver;
use cryptkeeper::journal_ops::{self, FILE_EXTENSION};
use cryptkeeper::passphrase::{
    ConstantPassphraseReader, PassphraseReader, TerminalPassphraseReader,
};

#[derive(Parser)]
#[command(name = "cryptkeeper")]
#[command(version)]
#[command(about = "Personal encrypted journal.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new encrypted journal entry
    #[command(alias = "w")]
    Write {
        /// Output file name; the .ck extension is appended
        #[arg(short, long, value_name = "NAME", default_value_t = default_file_name())]
        filename: String,

        /// Passphrase used to encrypt the entry; prompted for when absent
        #[arg(short, long, value_name = "PASSPHRASE")]
        passphrase: Option<String>,

        /// Editor to compose in; unsupported names fall back to vim
        #[arg(short, long, value_name = "EDITOR")]
        editor: Option<String>,
    },

    /// Read an encrypted journal entry
    #[command(alias = "r")]
    Read {
        /// Path to the encrypted journal file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Passphrase used when the entry was written; prompted for when absent
        #[arg(short, long, value_name = "PASSPHRASE")]
        passphrase: Option<String>,

        /// Editor to view in; unsupported names fall back to vim
        #[arg(short, long, value_name = "EDITOR")]
        editor: Option<String>,
    },
}

fn default_file_name() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H%M").to_string()
}

fn get_passphrase_reader(flag: Option<String>) -> Box<dyn PassphraseReader> {
    match flag {
        Some(passphrase) => Box::new(ConstantPassphraseReader::new(passphrase.into_bytes())),
        None => Box::new(TerminalPassphraseReader),
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Write {
            filename,
            passphrase,
            editor,
        } => {
            let mut reader = get_passphrase_reader(passphrase);
            let resolver = PreferredEditorResolver::new(editor.as_deref());
            let path = PathBuf::from(format!("{}{}", filename, FILE_EXTENSION));
            journal_ops::write_journal(&path, &mut *reader, &resolver)
        }
        Commands::Read {
            file,
            passphrase,
            editor,
        } => {
            let mut reader = get_passphrase_reader(passphrase);
            let resolver = PreferredEditorResolver::new(editor.as_deref());
            journal_ops::read_journal(&file, &mut *reader, &resolver)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
