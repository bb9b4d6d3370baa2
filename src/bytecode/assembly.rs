/*!
  Parses textual listings of instruction words, the input format of the disassembler.

  A listing is a sequence of words written in hexadecimal (`0x` prefixed) or decimal and
  separated by whitespace or commas. A `#` starts a comment that runs to the end of the line.

  ```text
    # GETIMPORT 0, 0 followed by its aux word
    0x000000A4 0x40000000
    159, 130   # CALL and RETURN, in decimal
  ```
*/

use nom::{
  branch::alt,
  bytes::complete::{tag_no_case, take_while, take_while1},
  character::complete::{digit1, hex_digit1},
  combinator::{all_consuming, map_res},
  multi::separated_list0,
  sequence::{delimited, preceded},
  IResult
};
use thiserror::Error;

use super::Word;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseWordsError {
  #[error("line {line}: `{token}` is not a 32 bit word")]
  InvalidToken {
    line: usize,
    token: String
  },
}

fn is_separator(c: char) -> bool {
  c == ' ' || c == '\t' || c == ','
}

fn hex_word(input: &str) -> IResult<&str, Word> {
  map_res(
    preceded(tag_no_case("0x"), hex_digit1),
    |digits: &str| Word::from_str_radix(digits, 16)
  )(input)
}

fn decimal_word(input: &str) -> IResult<&str, Word> {
  map_res(digit1, |digits: &str| digits.parse::<Word>())(input)
}

fn word(input: &str) -> IResult<&str, Word> {
  alt((hex_word, decimal_word))(input)
}

fn line_words(input: &str) -> IResult<&str, Vec<Word>> {
  delimited(
    take_while(is_separator),
    separated_list0(take_while1(is_separator), word),
    take_while(is_separator)
  )(input)
}

fn strip_comment(line: &str) -> &str {
  match line.find('#') {
    Some(start) => &line[..start],
    None => line
  }
}

/// Finds the first token of a line that does not parse as a word.
fn first_bad_token(line: &str) -> String {
  line
    .split(is_separator)
    .filter(|token| !token.is_empty())
    .find(|token| all_consuming(word)(*token).is_err())
    .unwrap_or(line)
    .to_string()
}

/// Parses a word listing. Line numbers in errors count from 1.
pub fn parse_words(text: &str) -> Result<Vec<Word>, ParseWordsError> {
  let mut words = Vec::new();

  for (number, line) in text.lines().enumerate() {
    let line = strip_comment(line).trim_end();

    match all_consuming(line_words)(line) {
      Ok((_, mut parsed)) => words.append(&mut parsed),
      Err(_) => {
        return Err(ParseWordsError::InvalidToken {
          line: number + 1,
          token: first_bad_token(line)
        });
      }
    }
  }

  Ok(words)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_and_decimal(){
    assert_eq!(parse_words("0x10 16 0XfF"), Ok(vec![16, 16, 255]));
    assert_eq!(parse_words("1,2,  3\t4"), Ok(vec![1, 2, 3, 4]));
    assert_eq!(parse_words("0xFFFFFFFF"), Ok(vec![u32::MAX]));
  }

  #[test]
  fn comments_and_blank_lines(){
    let text = "# header\n\n  0x01 # one\n2\n   # indented comment\n,3,\n";
    assert_eq!(parse_words(text), Ok(vec![1, 2, 3]));
    assert_eq!(parse_words(""), Ok(vec![]));
  }

  #[test]
  fn invalid_tokens(){
    assert_eq!(
      parse_words("1 2\n3 frob 4"),
      Err(ParseWordsError::InvalidToken { line: 2, token: "frob".to_string() })
    );
    assert_eq!(
      parse_words("12abc"),
      Err(ParseWordsError::InvalidToken { line: 1, token: "12abc".to_string() })
    );
    // Too large for a word.
    assert_eq!(
      parse_words("0x100000000"),
      Err(ParseWordsError::InvalidToken { line: 1, token: "0x100000000".to_string() })
    );
    assert_eq!(
      parse_words("-1"),
      Err(ParseWordsError::InvalidToken { line: 1, token: "-1".to_string() })
    );
  }
}
