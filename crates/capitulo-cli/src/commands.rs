use anyhow::{anyhow, Result};
use capitulo_core::Translation;

/// One typed line from the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Jump(u32),
    Back,
    Translation(Translation),
    Retry,
    Word { verse: u32, index: usize },
    Mark,
    CloseSelection,
    SpeakVerse(u32),
    SpeakChapter,
    StopSpeech,
    FontUp,
    FontDown,
    Options,
    Help,
    Quit,
}

pub const HELP: &str = "\
  n / p          next / previous chapter
  j <chapter>    jump to chapter
  b              back to the previous screen
  t <acf|nvi|ra> switch translation
  r              retry a failed load
  w <verse> <n>  open word n (0-based) of a verse
  m              mark / unmark the open word
  x              close the word menu
  s <verse>      speak a verse
  sc / st        speak whole chapter / stop speaking
  + / -          bigger / smaller text
  o              toggle the options menu
  h              this help
  q              quit";

pub fn parse(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(anyhow!("empty command"));
    };

    let command = match head {
        "n" => Command::Next,
        "p" => Command::Previous,
        "j" => Command::Jump(number(parts.next(), "chapter")?),
        "b" => Command::Back,
        "t" => {
            let code = parts.next().ok_or_else(|| anyhow!("missing translation code"))?;
            Command::Translation(Translation::parse(code)?)
        }
        "r" => Command::Retry,
        "w" => Command::Word {
            verse: number(parts.next(), "verse")?,
            index: number(parts.next(), "word index")?,
        },
        "m" => Command::Mark,
        "x" => Command::CloseSelection,
        "s" => Command::SpeakVerse(number(parts.next(), "verse")?),
        "sc" => Command::SpeakChapter,
        "st" => Command::StopSpeech,
        "+" => Command::FontUp,
        "-" => Command::FontDown,
        "o" => Command::Options,
        "h" | "?" => Command::Help,
        "q" => Command::Quit,
        other => return Err(anyhow!("unknown command '{}', type h for help", other)),
    };

    if parts.next().is_some() {
        return Err(anyhow!("too many arguments for '{}'", head));
    }
    Ok(command)
}

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T> {
    let arg = arg.ok_or_else(|| anyhow!("missing {}", what))?;
    arg.parse()
        .map_err(|_| anyhow!("'{}' is not a valid {}", arg, what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse("n").unwrap(), Command::Next);
        assert_eq!(parse(" p ").unwrap(), Command::Previous);
        assert_eq!(parse("j 12").unwrap(), Command::Jump(12));
        assert!(parse("j").is_err());
        assert!(parse("j twelve").is_err());
    }

    #[test]
    fn test_parse_word_and_translation() {
        assert_eq!(parse("w 3 5").unwrap(), Command::Word { verse: 3, index: 5 });
        assert_eq!(parse("t RA").unwrap(), Command::Translation(Translation::Ra));
        assert!(parse("t kjv").is_err());
        assert!(parse("w 3").is_err());
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert!(parse("").is_err());
        assert!(parse("zz").is_err());
        assert!(parse("n 3").is_err());
    }
}
