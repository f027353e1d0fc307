pub mod lines;
pub mod table;
pub mod tokens;

use lines::{remove_overflow_lines, retain_entry_lines, ParseError};
use table::{lines_to_df, VocabTable};
use tokens::trim_index;

/// Four-pass page pipeline: lines → entry lines → merged entries → index-free
/// entries → table.
pub fn pipeline_lines(text: &str, separator: &str) -> Result<VocabTable, ParseError> {
    let page_lines = retain_entry_lines(text.lines());
    let merged = remove_overflow_lines(&page_lines)?;
    let bodies = trim_index(&merged);
    Ok(lines_to_df(&bodies, separator))
}
