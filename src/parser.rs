use scraper::{ElementRef, Html, Selector};

const DETAILS_IMG_ALT: &str = "[More details for this library]";
const ADDRESS_LABEL: &str = "Library's street address";
const MAP_BOILERPLATE: &str = "(see also location map ) ";

/// One `<tr>` of the results table: cell texts plus the "more details" link
/// href, when the row carries one.
#[derive(Debug, Clone)]
pub struct RowData {
    pub cells: Vec<String>,
    pub details_href: Option<String>,
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The directory's results table. Its absence is the end-of-data signal.
pub fn results_table(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("table.summary").unwrap();
    doc.select(&selector).next()
}

/// Header texts of the results table, normalized to the output schema:
/// two directory names renamed, two synthetic columns appended.
pub fn parse_headers(table: ElementRef) -> Vec<String> {
    let th_sel = Selector::parse("th").unwrap();
    let mut headers: Vec<String> = table
        .select(&th_sel)
        .map(|th| {
            let text = squash_whitespace(&th.text().collect::<String>());
            match text.as_str() {
                "Library" => "Name".to_string(),
                "Parent organisation" => "ParentOrg".to_string(),
                _ => text,
            }
        })
        .collect();
    headers.push("OrgID".to_string());
    headers.push("Address".to_string());
    headers
}

/// Data rows of the results table, in document order. The header row and
/// rows without `<td>` cells are skipped.
pub fn parse_rows(table: ElementRef) -> Vec<RowData> {
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let mut rows = Vec::new();
    for tr in table.select(&tr_sel).skip(1) {
        let cells: Vec<String> = tr
            .select(&td_sel)
            .map(|td| squash_whitespace(&td.text().collect::<String>()))
            .collect();
        if cells.is_empty() {
            continue;
        }
        rows.push(RowData {
            cells,
            details_href: details_link(tr),
        });
    }
    rows
}

// The details link is marked by its icon, not a class: find the image by alt
// text, then the <a> enclosing it.
fn details_link(row: ElementRef) -> Option<String> {
    let img_sel = Selector::parse(&format!("img[alt=\"{}\"]", DETAILS_IMG_ALT)).unwrap();
    let img = row.select(&img_sel).next()?;
    for node in img.ancestors() {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "a" {
                return el.value().attr("href").map(str::to_string);
            }
        }
    }
    None
}

/// OrgID is the suffix after the last `=` of the details href.
pub fn org_id_from_href(href: &str) -> String {
    match href.rsplit_once('=') {
        Some((_, id)) => id.to_string(),
        None => String::new(),
    }
}

/// Street address from a library detail page: the paragraph whose leading
/// `<strong>` carries the address label, minus the label itself and the
/// location-map boilerplate.
pub fn extract_address(doc: &Html) -> Option<String> {
    let strong_sel = Selector::parse("strong").unwrap();
    let label = doc
        .select(&strong_sel)
        .find(|s| s.text().collect::<String>().contains(ADDRESS_LABEL))?;

    let paragraph = label.ancestors().find_map(|node| {
        ElementRef::wrap(node).filter(|el| el.value().name() == "p")
    })?;

    let parts: Vec<&str> = paragraph
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .skip(1) // the label
        .collect();

    // Collapse whitespace before stripping the boilerplate: the phrase is
    // usually broken across lines in the raw markup and would not match
    // otherwise.
    let address = squash_whitespace(&parts.join(" ")).replace(MAP_BOILERPLATE, "");
    let address = squash_whitespace(&address);
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <table class="summary">
          <tr><th>Library</th><th>Parent organisation</th></tr>
          <tr>
            <td>Ashfield  Library</td>
            <td>Inner West Council</td>
            <td><a href="libraries.cgi?action=LibDetails&amp;orgid=1234">
              <img alt="[More details for this library]" src="details.gif">
            </a></td>
          </tr>
          <tr>
            <td>Balmain Library</td>
            <td>Inner West Council</td>
          </tr>
        </table>
        </body></html>"#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
        <p><strong>Library's street address:</strong><br>
           (see also <a href="map.cgi">location map</a> )
           12   Brown Street<br>Ashfield NSW 2131</p>
        </body></html>"#;

    #[test]
    fn results_table_found_and_missing() {
        let doc = Html::parse_document(RESULTS_PAGE);
        assert!(results_table(&doc).is_some());
        let empty = Html::parse_document("<html><body><p>No results</p></body></html>");
        assert!(results_table(&empty).is_none());
    }

    #[test]
    fn headers_renamed_and_synthetic_columns_appended() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let table = results_table(&doc).unwrap();
        assert_eq!(
            parse_headers(table),
            vec!["Name", "ParentOrg", "OrgID", "Address"]
        );
    }

    #[test]
    fn rows_in_order_with_normalized_cells() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let table = results_table(&doc).unwrap();
        let rows = parse_rows(table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[0], "Ashfield Library");
        assert_eq!(rows[1].cells[0], "Balmain Library");
        assert_eq!(
            rows[0].details_href.as_deref(),
            Some("libraries.cgi?action=LibDetails&orgid=1234")
        );
        assert!(rows[1].details_href.is_none());
    }

    #[test]
    fn org_id_is_suffix_after_last_equals() {
        assert_eq!(org_id_from_href("libraries.cgi?action=LibDetails&orgid=1234"), "1234");
        assert_eq!(org_id_from_href("no-query-string"), "");
    }

    #[test]
    fn address_skips_label_and_strips_map_boilerplate() {
        let doc = Html::parse_document(DETAIL_PAGE);
        assert_eq!(
            extract_address(&doc).as_deref(),
            Some("12 Brown Street Ashfield NSW 2131")
        );
    }

    #[test]
    fn boilerplate_stripped_when_split_across_lines() {
        // The closing paren of the map note sits on its own line in the real
        // markup, with the street address starting on the next one.
        let page = "<html><body>\
            <p><strong>Library's street address:</strong><br>\n\
               (see also <a href=\"map.cgi\">location map</a>\n\
               )\n\
               99 Brown Street<br>Sydney NSW 2000</p>\
            </body></html>";
        let doc = Html::parse_document(page);
        assert_eq!(
            extract_address(&doc).as_deref(),
            Some("99 Brown Street Sydney NSW 2000")
        );
    }

    #[test]
    fn address_absent_when_label_missing() {
        let doc = Html::parse_document("<html><body><p>Nothing here</p></body></html>");
        assert!(extract_address(&doc).is_none());
    }
}
