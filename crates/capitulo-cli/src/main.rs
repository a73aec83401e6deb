use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use capitulo_core::{
    BibliaDigitalClient, ChapterRef, ChapterRoute, ChapterScreen, Config, EspeakEngine, Translation,
};

mod commands;
mod render;

use commands::Command;

#[derive(Parser)]
#[command(name = "capitulo")]
#[command(about = "Read a Bible chapter, mark words and hear verses spoken")]
struct Cli {
    /// Book abbreviation, e.g. gn, sl, jo
    book: String,
    /// Chapter to open
    #[arg(default_value = "1")]
    chapter: u32,
    /// Translation to start with (acf, nvi, ra)
    #[arg(short, long)]
    translation: Option<String>,
    /// Number of chapters in the book (looked up when omitted)
    #[arg(long)]
    chapters: Option<u32>,
    /// Book display name (looked up when omitted)
    #[arg(long)]
    name: Option<String>,
    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What ended a chapter screen.
enum Outcome {
    Push(ChapterRoute),
    Back,
    Quit,
}

type Input = Lines<BufReader<Stdin>>;
type Screen = ChapterScreen<BibliaDigitalClient, EspeakEngine>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not read config, using defaults");
        Config::new()
    });
    if config.api_key.is_none() {
        tracing::warn!("No API key set; requests are rate limited. Set BIBLIA_API_KEY.");
    }

    let mut settings = config.screen_settings();
    if let Some(code) = &cli.translation {
        settings.translation = Translation::parse(code)?;
    }

    let source = Arc::new(BibliaDigitalClient::new(&config.base_url, config.api_key.as_deref()));
    let route = initial_route(&cli, &source).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stack: Vec<ChapterRoute> = vec![route];

    while let Some(route) = stack.last().cloned() {
        let chapter = ChapterRef::from_route(&route)?;
        let mut screen = ChapterScreen::new(
            chapter,
            Arc::clone(&source),
            EspeakEngine::new(&config.speech_program),
            settings.clone(),
        );

        let outcome = run_screen(&mut screen, &mut input).await;
        screen.unmount();

        match outcome? {
            Outcome::Push(next) => stack.push(next),
            Outcome::Back => {
                stack.pop();
            }
            Outcome::Quit => break,
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn initial_route(cli: &Cli, source: &BibliaDigitalClient) -> Result<ChapterRoute> {
    let (name, chapters) = match (&cli.name, cli.chapters) {
        (Some(name), Some(chapters)) => (name.clone(), chapters),
        _ => {
            let book = source
                .fetch_book(&cli.book)
                .await
                .map_err(|e| anyhow!("Could not look up book '{}': {}", cli.book, e))?;
            (cli.name.clone().unwrap_or(book.name), cli.chapters.unwrap_or(book.chapters))
        }
    };

    let chapter = ChapterRef::new(cli.book.clone(), name, cli.chapter, chapters)?;
    Ok(chapter.route())
}

/// Drive one screen until the reader navigates away.
async fn run_screen(screen: &mut Screen, input: &mut Input) -> Result<Outcome> {
    let mut snapshots = screen.subscribe();
    screen.mount().await;
    render::render(&snapshots.borrow_and_update());

    loop {
        tokio::select! {
            Some(completion) = screen.recv_completion() => {
                screen.handle_completion(completion);
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    return Ok(Outcome::Quit);
                };
                if line.trim().is_empty() {
                    continue;
                }
                match commands::parse(&line) {
                    Ok(command) => {
                        if let Some(outcome) = apply(screen, command) {
                            return Ok(outcome);
                        }
                    }
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
        }

        if snapshots.has_changed().unwrap_or(false) {
            render::render(&snapshots.borrow_and_update());
        }
    }
}

fn apply(screen: &mut Screen, command: Command) -> Option<Outcome> {
    match command {
        Command::Next => match screen.next_route() {
            Some(route) => return Some(Outcome::Push(route)),
            None => println!("{}", "Already at the last chapter".yellow()),
        },
        Command::Previous => match screen.previous_route() {
            Some(route) => return Some(Outcome::Push(route)),
            None => println!("{}", "Already at the first chapter".yellow()),
        },
        Command::Jump(chapter) => match screen.jump_route(chapter) {
            Ok(route) => return Some(Outcome::Push(route)),
            Err(e) => println!("{}", e.to_string().red()),
        },
        Command::Back => return Some(Outcome::Back),
        Command::Translation(translation) => screen.select_translation(translation),
        Command::Retry => screen.retry(),
        Command::Word { verse, index } => {
            if screen.tap_word(verse, index).is_none() {
                println!("{}", format!("No word {} in verse {}", index, verse).yellow());
            }
        }
        Command::Mark => {
            if screen.toggle_selected_mark().is_none() {
                println!("{}", "Open a word first with: w <verse> <n>".yellow());
            }
        }
        Command::CloseSelection => screen.close_selection(),
        Command::SpeakVerse(verse) => {
            if !screen.speak_verse(verse) {
                println!("{}", format!("Verse {} is not on screen", verse).yellow());
            }
        }
        Command::SpeakChapter => {
            screen.speak_chapter();
        }
        Command::StopSpeech => screen.stop_speech(),
        Command::FontUp => screen.increase_font_size(),
        Command::FontDown => screen.decrease_font_size(),
        Command::Options => screen.toggle_options(),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => return Some(Outcome::Quit),
    }
    None
}
