use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::crawler::models::{Color, Price};
use crate::error::ScrapeError;

/// One listing-page tile, pointing at its detail page. The href is kept raw
/// and resolved against the listing URL when the detail page is fetched.
#[derive(Debug, Clone)]
pub struct ProductTile {
    pub raw_id: String,
    pub brand_name: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product_name: String,
    pub colors: BTreeSet<Color>,
    pub price: Price,
}

/// Collects the listing page's product tiles and shuffles their order, so
/// repeated runs don't hit the origin in an identical sequence.
pub fn extract_tiles(html: &str) -> Vec<ProductTile> {
    let document = Html::parse_document(html);
    let tile_sel = Selector::parse(r#"[data-test-id="ProductTile"]"#).unwrap();
    let brand_sel = Selector::parse(r#"[data-test-id="BrandName"]"#).unwrap();

    let mut tiles: Vec<ProductTile> = document
        .select(&tile_sel)
        .map(|tile| ProductTile {
            raw_id: tile.value().attr("id").unwrap_or_default().to_string(),
            brand_name: tile
                .select(&brand_sel)
                .next()
                .map(element_text)
                .unwrap_or_default(),
            href: tile.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect();

    tiles.shuffle(&mut rand::rng());
    tiles
}

/// Pulls name, price and color variants out of the detail page's buy box.
pub fn extract_detail(html: &str) -> Result<ProductDetail, ScrapeError> {
    let document = Html::parse_document(html);
    let buy_box_sel = Selector::parse(r#"[data-test-id="BuyBox"]"#).unwrap();

    let buy_box = document
        .select(&buy_box_sel)
        .next()
        .ok_or(ScrapeError::MissingRegion { selector: "BuyBox" })?;

    let name_sel = Selector::parse(r#"[data-test-id="ProductName"]"#).unwrap();
    let product_name = buy_box
        .select(&name_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();

    // Whichever of the base/sale price displays the page carries.
    let price_sel = Selector::parse(
        r#"[data-test-id="ProductPriceFormattedBasePrice"], [data-test-id="ProductPriceFormattedSalePrice"]"#,
    )
    .unwrap();
    let price_text = buy_box
        .select(&price_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let price = parse_display_price(&price_text)?;

    Ok(ProductDetail {
        product_name,
        colors: extract_colors(buy_box)?,
        price,
    })
}

/// The first element that is both marked active and carries color info wins;
/// later matches are dropped, mirroring the source markup's single-variant
/// assumption.
fn extract_colors(buy_box: ElementRef<'_>) -> Result<BTreeSet<Color>, ScrapeError> {
    let active_sel = Selector::parse("div.active").unwrap();
    let info_sel = Selector::parse(r#"[data-test-id="ColorVariantColorInfo"]"#).unwrap();

    let info = buy_box
        .select(&active_sel)
        .filter_map(|el| el.select(&info_sel).next())
        .next()
        .ok_or(ScrapeError::NoActiveColor)?;

    let colors = element_text(info)
        .split('/')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Color::new)
        .collect();

    Ok(colors)
}

/// Splits a displayed price like `1.234,56 €` into value and currency token.
/// The currency is whatever trails the last `digits [,.] digits` run; the
/// value keeps only digits and the comma, the locale's decimal separator.
fn parse_display_price(text: &str) -> Result<Price, ScrapeError> {
    let malformed = || ScrapeError::MalformedField {
        field: "price",
        value: text.to_string(),
    };

    let amount_re = Regex::new(r"^.*\d[.,]\d+\s*").unwrap();
    let currency_code = amount_re.replace(text, "").trim().to_string();
    if currency_code.is_empty() {
        return Err(malformed());
    }

    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    let value: f64 = digits.replace(',', ".").parse().map_err(|_| malformed())?;

    Ok(Price::new(value, currency_code))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <a data-test-id="ProductTile" id="1001" href="/p/alpha-bomber-1001">
            <span data-test-id="BrandName">Alpha Industries</span>
          </a>
          <a data-test-id="ProductTile" id="1002" href="/p/beta-parka-1002">
            <span data-test-id="BrandName">Beta</span>
          </a>
        </body></html>"#;

    const DETAIL: &str = r#"
        <html><body>
          <div data-test-id="BuyBox">
            <h1 data-test-id="ProductName">Bomber Jacket</h1>
            <span data-test-id="ProductPriceFormattedBasePrice">1.234,56 €</span>
            <div class="variant active">
              <div data-test-id="ColorVariantColorInfo">schwarz / weiß / schwarz</div>
            </div>
            <div class="variant">
              <div data-test-id="ColorVariantColorInfo">rot</div>
            </div>
          </div>
        </body></html>"#;

    #[test]
    fn collects_every_tile() {
        let mut tiles = extract_tiles(LISTING);
        tiles.sort_by(|a, b| a.raw_id.cmp(&b.raw_id));

        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].raw_id, "1001");
        assert_eq!(tiles[0].brand_name, "Alpha Industries");
        assert_eq!(tiles[0].href, "/p/alpha-bomber-1001");
        assert_eq!(tiles[1].raw_id, "1002");
    }

    #[test]
    fn extracts_detail_fields() {
        let detail = extract_detail(DETAIL).unwrap();

        assert_eq!(detail.product_name, "Bomber Jacket");
        assert_eq!(detail.price, Price::new(1234.56, "€"));
        assert_eq!(
            detail.colors,
            BTreeSet::from([Color::new("schwarz"), Color::new("weiß")])
        );
    }

    #[test]
    fn reads_sale_price_display() {
        let html = r#"
            <div data-test-id="BuyBox">
              <h1 data-test-id="ProductName">Parka</h1>
              <span data-test-id="ProductPriceFormattedSalePrice">89,99 EUR</span>
              <div class="active"><div data-test-id="ColorVariantColorInfo">oliv</div></div>
            </div>"#;

        let detail = extract_detail(html).unwrap();
        assert_eq!(detail.price, Price::new(89.99, "EUR"));
    }

    #[test]
    fn missing_buy_box_is_an_error() {
        let err = extract_detail("<html><body><p>moved</p></body></html>").unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingRegion { selector: "BuyBox" }
        ));
    }

    #[test]
    fn first_active_variant_with_color_info_wins() {
        let html = r#"
            <div data-test-id="BuyBox">
              <h1 data-test-id="ProductName">Parka</h1>
              <span data-test-id="ProductPriceFormattedBasePrice">10,00 €</span>
              <div class="swatch active"><span>no color info here</span></div>
              <div class="swatch active"><div data-test-id="ColorVariantColorInfo">blau</div></div>
              <div class="swatch active"><div data-test-id="ColorVariantColorInfo">grün</div></div>
            </div>"#;

        let detail = extract_detail(html).unwrap();
        assert_eq!(detail.colors, BTreeSet::from([Color::new("blau")]));
    }

    #[test]
    fn no_active_variant_is_an_error() {
        let html = r#"
            <div data-test-id="BuyBox">
              <span data-test-id="ProductPriceFormattedBasePrice">10,00 €</span>
              <div class="swatch"><div data-test-id="ColorVariantColorInfo">blau</div></div>
            </div>"#;

        assert!(matches!(
            extract_detail(html).unwrap_err(),
            ScrapeError::NoActiveColor
        ));
    }

    #[test]
    fn splits_thousands_separated_price() {
        let price = parse_display_price("1.234,56 €").unwrap();
        assert_eq!(price.value, 1234.56);
        assert_eq!(price.currency_code, "€");
    }

    #[test]
    fn splits_plain_price_with_code_suffix() {
        let price = parse_display_price("29,99 EUR").unwrap();
        assert_eq!(price.value, 29.99);
        assert_eq!(price.currency_code, "EUR");
    }

    #[test]
    fn price_without_currency_suffix_is_malformed() {
        assert!(matches!(
            parse_display_price("1.234,56").unwrap_err(),
            ScrapeError::MalformedField { field: "price", .. }
        ));
    }

    #[test]
    fn empty_price_text_is_malformed() {
        assert!(matches!(
            parse_display_price("").unwrap_err(),
            ScrapeError::MalformedField { field: "price", .. }
        ));
    }
}
