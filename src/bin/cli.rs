//! The CLI surface (§6): reads grammar source text in one surface language
//! and prints the parsed grammar's Lisp IR form.
//!
//! Grounded in `mdubinko-earleybird`'s `eb.rs`/`cmd_parse.rs` for the
//! `argh`-derived option shape, and in
//! `original_source/polygrammar/cli.py` for the flag/positional split: a
//! `-g/--grammar-language` choice plus one positional `text` argument,
//! which is the grammar source to parse (not input to run that grammar
//! against — the original CLI only ever exercises the surface-grammar
//! loaders, never the runtime parser).

use argh::FromArgs;

/// Parse grammar source text in a surface language and print its IR.
#[derive(FromArgs)]
struct Args {
    /// surface grammar language: lisp, abnf, or ebnf
    #[argh(option, short = 'g', default = "GrammarLanguage::Lisp")]
    grammar_language: GrammarLanguage,

    /// the grammar source text to parse
    #[argh(positional)]
    text: String,
}

enum GrammarLanguage {
    Lisp,
    Abnf,
    Ebnf,
}

impl std::str::FromStr for GrammarLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lisp" => Ok(GrammarLanguage::Lisp),
            "abnf" => Ok(GrammarLanguage::Abnf),
            "ebnf" => Ok(GrammarLanguage::Ebnf),
            other => Err(format!("unknown grammar language {other:?} (expected lisp, abnf, or ebnf)")),
        }
    }
}

fn main() {
    env_logger::init();
    let args: Args = argh::from_env();

    match args.grammar_language {
        GrammarLanguage::Lisp => match polygrammar::lisp::parse_grammar(&args.text) {
            Ok(grammar) => {
                println!("{}", polygrammar::lisp::write_grammar(&grammar));
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
        GrammarLanguage::Abnf | GrammarLanguage::Ebnf => {
            eprintln!(
                "error: the {} surface grammar loader is an external collaborator, not part of this engine",
                if matches!(args.grammar_language, GrammarLanguage::Abnf) {
                    "abnf"
                } else {
                    "ebnf"
                }
            );
            std::process::exit(2);
        }
    }
}
