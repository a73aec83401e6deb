use capitulo_core::{ChapterView, ScreenSnapshot, Translation, VerseView};
use colored::*;

pub fn render(snapshot: &ScreenSnapshot) {
    println!();
    println!("{}", snapshot.book_name.bold().blue());
    println!(
        "{}  {}  {}",
        format!("Capítulo {} de {}", snapshot.chapter_number, snapshot.total_chapters).bold(),
        snapshot.translation.as_str().to_uppercase().cyan(),
        format!("Aa {}", snapshot.font_size.get()).dimmed()
    );
    println!("{}", "=".repeat(50).dimmed());

    if snapshot.options_visible {
        render_options(snapshot);
    }

    match &snapshot.view {
        ChapterView::Loading { placeholder_rows } => {
            for _ in 0..*placeholder_rows {
                println!("{}", "░".repeat(40).dimmed());
            }
        }
        ChapterView::Ready { verses } => {
            for verse in verses {
                println!("{}", verse_line(verse));
            }
        }
        ChapterView::Failed { message } => {
            println!("{}", message.red());
            println!("Type {} to try again", "r".bold());
        }
    }

    println!("{}", "=".repeat(50).dimmed());

    if let Some(word) = &snapshot.selection {
        println!(
            "{} '{}' (verse {}, word {}): {} mark, {} close",
            "Selected".bold().yellow(),
            word.text,
            word.verse_number,
            word.word_index,
            "m".bold(),
            "x".bold()
        );
    }

    let previous = if snapshot.can_go_previous { "p ◀".normal() } else { "p ◀".dimmed() };
    let next = if snapshot.can_go_next { "▶ n".normal() } else { "▶ n".dimmed() };
    let speech = match (snapshot.speech_available, snapshot.speaking) {
        (false, _) => "🔇".dimmed(),
        (true, true) => "🔊 speaking".green(),
        (true, false) => "🔊".normal(),
    };
    println!("{}   {}   {}", previous, next, speech);
}

fn render_options(snapshot: &ScreenSnapshot) {
    println!("{}", "Options".bold());
    for translation in Translation::all() {
        let marker = if translation == snapshot.translation { "●" } else { "○" };
        println!(
            "  {} t {:<4} {}",
            marker,
            translation.as_str(),
            translation.display_name().dimmed()
        );
    }
    println!("  sc  speak chapter");
    println!("  +/- text size");
    println!("{}", "-".repeat(50).dimmed());
}

fn verse_line(verse: &VerseView) -> String {
    let words: Vec<String> = verse
        .words
        .iter()
        .map(|word| {
            if word.marked {
                word.text.black().on_yellow().to_string()
            } else {
                word.text.clone()
            }
        })
        .collect();

    format!(
        "{}  {}",
        verse.number.to_string().bold().truecolor(212, 60, 18),
        words.join(" ")
    )
}
