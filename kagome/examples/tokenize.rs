//! Tokenizes standard input lines and prints surfaces with features.
//!
//! Usage: `tokenize [path/to/ipa.dict]`. Without a bundle path the
//! built-in fallback dictionary is used.

use std::io::BufRead;
use std::sync::Arc;

use kagome::{Dict, Tokenizer};

fn main() {
    let dict = match std::env::args().nth(1) {
        Some(path) => match Dict::from_path(&path) {
            Ok((dict, report)) => {
                for note in report.notes() {
                    eprintln!("{note}");
                }
                dict
            }
            Err(e) => {
                eprintln!("failed to load {path}: {e}; using the fallback dictionary");
                Dict::fallback()
            }
        },
        None => Dict::fallback(),
    };

    let tokenizer = Tokenizer::new(Arc::new(dict));
    let mut worker = tokenizer.new_worker();

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        worker.reset_sentence(line.trim_end());
        worker.tokenize();
        for token in worker.token_iter() {
            println!("{}\t{}", token.surface(), token.features().join(","));
        }
        println!("EOS");
    }
}
