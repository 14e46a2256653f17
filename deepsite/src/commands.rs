use crate::CLAP_STYLING;
use clap::builder::RangedU64ValueParser;
use clap::{Arg, ArgAction, arg, command};

fn url_arg() -> Arg {
    arg!(-u --"url" <URL>)
        .required(true)
        .help("The root URL of the site (http:// is assumed when no scheme is given)")
}

/// Flags that override the crawl settings read from the environment
fn crawl_args() -> Vec<Arg> {
    vec![
        arg!(--"max-pages" <NUM>)
            .required(false)
            .help("Maximum number of pages to keep (env: MAX_PAGES)")
            .value_parser(clap::value_parser!(usize)),
        arg!(--"max-depth" <NUM>)
            .required(false)
            .help("Maximum link depth from the root (env: MAX_DEPTH)")
            .value_parser(clap::value_parser!(usize)),
        arg!(-p --"parallel" <NUM>)
            .required(false)
            .help("Number of pages fetched at once (env: PARALLEL_FETCHES)")
            .value_parser(RangedU64ValueParser::<usize>::new().range(1..)),
        arg!(--"no-sitemap")
            .required(false)
            .help("Do not seed the crawl from /sitemap.xml")
            .action(ArgAction::SetTrue),
    ]
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("deepsite")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("deepsite")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"quiet" "Suppress progress spinners and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about("Crawl a site and print what was collected. No model is contacted.")
                .arg(url_arg())
                .args(crawl_args()),
        )
        .subcommand(
            command!("summarize")
                .about("Crawl a site and print a structured summary of it")
                .arg(url_arg())
                .args(crawl_args())
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the summary report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("ask")
                .about(
                    "Summarize a site, then answer questions about it. Without --question or \
                --questions-file, questions are read from stdin.",
                )
                .arg(url_arg())
                .args(crawl_args())
                .arg(
                    arg!(-q --"question" <QUESTION>)
                        .required(false)
                        .help("A question to ask; may be repeated")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-Q --"questions-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of questions")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-summary")
                        .required(false)
                        .help("Do not print the site summary before the answers")
                        .action(ArgAction::SetTrue),
                ),
        )
}
