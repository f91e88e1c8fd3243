//! Interactive view selection.
//!
//! The menu reads from any `BufRead` and writes to any `Write`, so the
//! prompt loop is unit-testable with in-memory buffers. Invalid input
//! re-displays the menu rather than failing; only end-of-input ends the
//! loop without a choice.

use std::io::{BufRead, Write};

use crate::models::View;

/// Show the menu until the reader produces a valid choice.
///
/// Returns `Ok(None)` when input ends before a valid choice is made.
pub fn prompt_view<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> std::io::Result<Option<View>> {
    loop {
        write_menu(output)?;
        write!(output, "Enter the number of the data you want to visualize: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_choice(&line) {
            Some(view) => return Ok(Some(view)),
            None => {
                writeln!(
                    output,
                    "Invalid option, please select a valid number from the menu."
                )?;
            }
        }
    }
}

fn write_menu<W: Write>(output: &mut W) -> std::io::Result<()> {
    writeln!(output)?;
    writeln!(output, "--- Data Visualization Options ---")?;
    for view in View::ALL {
        writeln!(output, "{}: {}", view.number(), view.menu_label())?;
    }
    Ok(())
}

/// A trimmed menu number. Anything else is invalid.
fn parse_choice(line: &str) -> Option<View> {
    line.trim().parse::<u8>().ok().and_then(View::from_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_menu(input: &str) -> (Option<View>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let view = prompt_view(&mut reader, &mut output).unwrap();
        (view, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_valid_choice() {
        let (view, shown) = run_menu("3\n");

        assert_eq!(view, Some(View::MonthlyDeathsByMentalIllness));
        assert!(shown.contains("--- Data Visualization Options ---"));
        assert!(shown.contains("1: Visualize Monthly Deaths"));
        assert!(shown.contains("4: Visualize Average Poverty Rate by Geographical Area"));
        assert!(shown.contains("5: Compare Deaths with Poverty Rate by State"));
        assert!(shown.contains("Enter the number of the data you want to visualize: "));
        assert!(!shown.contains("Invalid option"));
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let (view, shown) = run_menu("9\nabc\n2\n");

        assert_eq!(view, Some(View::MonthlyDeathsByRace));
        assert_eq!(
            shown
                .matches("Invalid option, please select a valid number from the menu.")
                .count(),
            2
        );
        assert_eq!(shown.matches("--- Data Visualization Options ---").count(), 3);
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let (view, _) = run_menu("  2  \n");

        assert_eq!(view, Some(View::MonthlyDeathsByRace));
    }

    #[test]
    fn test_end_of_input_ends_cleanly() {
        let (view, shown) = run_menu("");

        assert_eq!(view, None);
        assert!(shown.contains("--- Data Visualization Options ---"));
    }

    #[test]
    fn test_parse_choice_bounds() {
        assert_eq!(parse_choice("1"), Some(View::MonthlyDeaths));
        assert_eq!(parse_choice("5\n"), Some(View::DeathsVsPoverty));
        assert_eq!(parse_choice("0"), None);
        assert_eq!(parse_choice("6"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("two"), None);
    }
}
