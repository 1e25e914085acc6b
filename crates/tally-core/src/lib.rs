pub mod error;
pub mod extraction;
pub mod formats;
pub mod model;
pub mod parsing;

use error::TallyError;
use extraction::{PageContent, PdfExtractor};
use model::ParserId;
use parsing::{ParseOptions, ParsedStatement};

/// Main API entry point: parse one statement with the named parser.
///
/// The parser id is checked before any bytes are read. PDF formats go through
/// `extractor`; the CSV parser reads `bytes` directly.
#[tracing::instrument(skip(bytes, extractor, options), fields(len = bytes.len()))]
pub fn parse_statement(
    parser_id: &str,
    bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &ParseOptions,
) -> Result<ParsedStatement, TallyError> {
    let id: ParserId = parser_id.parse()?;

    let parse_pages: fn(&[PageContent], &ParseOptions) -> ParsedStatement = match id {
        ParserId::GenericCsv => return formats::csv::parse(bytes, options),
        ParserId::DbsPaylah => formats::paylah::parse,
        ParserId::DbsPosb => formats::posb::parse,
        ParserId::OcbcFrank => formats::ocbc::parse,
    };

    let pages = extractor.extract_pages(bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted pages"
    );
    if !pages.iter().any(|p| p.has_content()) {
        return Err(TallyError::NoTextContent);
    }

    Ok(parse_pages(&pages, options))
}
