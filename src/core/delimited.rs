//! Plaintext cookbook format built from `;` separated fields.
//!
//! A record holds one recipe in three parts:
//!
//! ```text
//! Cake;4                      name;portions
//! Flour;200.0;g&Egg;2.0;stk&  ingredients, each terminated by '&'
//! Mix and bake.               description, verbatim
//! ```
//!
//! [`DelimitedLayout::Lines`] writes the parts on three physical lines. The
//! older [`DelimitedLayout::Sentinel`] layout writes them on one line joined
//! by the literal two-character token `/n`. Either way records are separated
//! by a single newline with none after the last record.
//!
//! The format carries neither the cookbook name nor a recipe's label and
//! favorite flag.

use crate::core::{
    check_encodable, check_ingredient_name, check_recipe_name, decode_text, narrow_portions,
    push_recipe, Codec, Cookbook, DecodeOptions, Ingredient, Recipe,
};
use crate::utils::error::{CookbookError, Location, Result};
use serde::{Deserialize, Serialize};

pub const FIELD_SEPARATOR: char = ';';
pub const INGREDIENT_SEPARATOR: char = '&';
pub const SENTINEL: &str = "/n";
pub const DEFAULT_COOKBOOK_NAME: &str = "Cookbook";

const LINE_BREAKS: [&str; 2] = ["\n", "\r"];

/// Physical arrangement of the three record parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimitedLayout {
    /// Header, ingredients and description on separate lines.
    #[default]
    Lines,
    /// One line per record, parts joined by the `/n` token.
    Sentinel,
}

#[derive(Debug, Clone)]
pub struct DelimitedCodec {
    layout: DelimitedLayout,
    cookbook_name: String,
    reject_lossy: bool,
    options: DecodeOptions,
}

impl Default for DelimitedCodec {
    fn default() -> Self {
        Self {
            layout: DelimitedLayout::default(),
            cookbook_name: DEFAULT_COOKBOOK_NAME.to_string(),
            reject_lossy: false,
            options: DecodeOptions::default(),
        }
    }
}

/// The three textual parts of one record, with their 1-based line numbers.
struct RawRecord<'a> {
    header: (&'a str, usize),
    ingredients: (&'a str, usize),
    description: &'a str,
}

impl DelimitedCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: DelimitedLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Name given to decoded cookbooks, since the format does not store one.
    pub fn with_cookbook_name(mut self, name: impl Into<String>) -> Self {
        self.cookbook_name = name.into();
        self
    }

    /// Fail encoding instead of dropping a label or favorite flag.
    pub fn with_reject_lossy(mut self, reject: bool) -> Self {
        self.reject_lossy = reject;
        self
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn layout(&self) -> DelimitedLayout {
        self.layout
    }

    fn encode_record(&self, recipe: &Recipe, location: Location) -> Result<String> {
        check_encodable(recipe, &location)?;

        if self.reject_lossy {
            if recipe.is_labeled() {
                return Err(CookbookError::encoding(
                    location.field("Label"),
                    "the delimited format cannot store labels",
                ));
            }
            if recipe.is_favorite() {
                return Err(CookbookError::encoding(
                    location.field("Favorite"),
                    "the delimited format cannot store the favorite flag",
                ));
            }
        }

        let sentinel: &[&str] = match self.layout {
            DelimitedLayout::Lines => &[],
            DelimitedLayout::Sentinel => &[SENTINEL],
        };

        check_representable(
            recipe.name(),
            &[";"],
            sentinel,
            location.clone().field("Name"),
        )?;
        let header = format!("{}{}{}", recipe.name(), FIELD_SEPARATOR, recipe.portions());

        let mut ingredients = String::new();
        for (index, ingredient) in recipe.ingredients().iter().enumerate() {
            let at = location.clone().ingredient(index);
            check_representable(ingredient.name(), &[";", "&"], sentinel, at.clone().field("Name"))?;
            check_representable(ingredient.unit(), &[";", "&"], sentinel, at.clone().field("Unit"))?;
            if !ingredient.amount().is_finite() {
                return Err(CookbookError::encoding(
                    at.field("Amount"),
                    format!("amount {} is not a finite number", ingredient.amount()),
                ));
            }

            // Debug formatting keeps a fractional part ("200.0") and round-trips exactly.
            ingredients.push_str(&format!(
                "{}{}{:?}{}{}{}",
                ingredient.name(),
                FIELD_SEPARATOR,
                ingredient.amount(),
                FIELD_SEPARATOR,
                ingredient.unit(),
                INGREDIENT_SEPARATOR
            ));
        }

        check_representable(
            recipe.description(),
            &[],
            &[],
            location.field("Description"),
        )?;

        let joiner = match self.layout {
            DelimitedLayout::Lines => "\n",
            DelimitedLayout::Sentinel => SENTINEL,
        };
        Ok([header.as_str(), ingredients.as_str(), recipe.description()].join(joiner))
    }

    fn split_records<'a>(&self, text: &'a str) -> Result<Vec<RawRecord<'a>>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        // Legacy writers ended the file with a newline.
        let trailing_newline = match self.layout {
            DelimitedLayout::Lines => lines.len() % 3 == 1,
            DelimitedLayout::Sentinel => true,
        };
        if trailing_newline && lines.len() > 1 && lines.last() == Some(&"") {
            tracing::warn!("Ignoring trailing newline after the last record");
            lines.pop();
        }

        match self.layout {
            DelimitedLayout::Lines => {
                let mut records = Vec::with_capacity(lines.len() / 3);
                for (index, chunk) in lines.chunks(3).enumerate() {
                    let first_line = index * 3 + 1;
                    match chunk {
                        [header, ingredients, description] => records.push(RawRecord {
                            header: (*header, first_line),
                            ingredients: (*ingredients, first_line + 1),
                            description: *description,
                        }),
                        _ => {
                            return Err(CookbookError::format(
                                Location::recipe(index).at_line(first_line + chunk.len()),
                                "record is truncated: expected header, ingredient and description lines",
                            ))
                        }
                    }
                }
                Ok(records)
            }
            DelimitedLayout::Sentinel => lines
                .into_iter()
                .enumerate()
                .map(|(index, line)| {
                    let mut parts = line.splitn(3, SENTINEL);
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(header), Some(ingredients), Some(description)) => Ok(RawRecord {
                            header: (header, index + 1),
                            ingredients: (ingredients, index + 1),
                            description,
                        }),
                        _ => Err(CookbookError::format(
                            Location::recipe(index).at_line(index + 1),
                            format!("record is truncated: expected two '{}' tokens", SENTINEL),
                        )),
                    }
                })
                .collect(),
        }
    }

    fn decode_record(&self, raw: &RawRecord<'_>, location: Location) -> Result<Recipe> {
        let (header, header_line) = raw.header;
        let fields: Vec<&str> = header.split(FIELD_SEPARATOR).collect();
        let [name, portions] = fields.as_slice() else {
            return Err(CookbookError::format(
                location.at_line(header_line),
                format!(
                    "header must have 2 fields 'name;portions', found {}",
                    fields.len()
                ),
            ));
        };

        check_recipe_name(name, &location.clone().field("Name").at_line(header_line))?;

        let portions_location = location.clone().field("Portions").at_line(header_line);
        let portions = portions.parse::<i64>().map_err(|_| {
            CookbookError::format(
                portions_location.clone(),
                format!("portions '{}' is not an integer", portions),
            )
        })?;
        let portions = narrow_portions(portions, &portions_location)?;

        let (ingredient_line, line) = raw.ingredients;
        let mut recipe = Recipe::new(*name, portions).with_description(raw.description);
        for ingredient in self.decode_ingredients(ingredient_line, &location, line)? {
            recipe.add_ingredient(ingredient);
        }

        Ok(recipe)
    }

    fn decode_ingredients(
        &self,
        line: &str,
        location: &Location,
        line_number: usize,
    ) -> Result<Vec<Ingredient>> {
        // The separator also terminates the last ingredient.
        let body = line.strip_suffix(INGREDIENT_SEPARATOR).unwrap_or(line);
        if body.is_empty() {
            return Ok(Vec::new());
        }

        body.split(INGREDIENT_SEPARATOR)
            .enumerate()
            .map(|(index, token)| {
                let at = location.clone().ingredient(index).at_line(line_number);
                let fields: Vec<&str> = token.split(FIELD_SEPARATOR).collect();
                let [name, amount, unit] = fields.as_slice() else {
                    return Err(CookbookError::format(
                        at,
                        format!(
                            "ingredient must have 3 fields 'name;amount;unit', found {}",
                            fields.len()
                        ),
                    ));
                };

                check_ingredient_name(name, &at.clone().field("Name"))?;

                let amount_location = at.field("Amount");
                let amount = amount.parse::<f64>().map_err(|_| {
                    CookbookError::format(
                        amount_location.clone(),
                        format!("amount '{}' is not a decimal number", amount),
                    )
                })?;
                let amount = self.options.check_amount(amount, &amount_location)?;

                Ok(Ingredient::new(*name, amount, *unit))
            })
            .collect()
    }
}

impl Codec for DelimitedCodec {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn encode_cookbook(&self, cookbook: &Cookbook) -> Result<Vec<u8>> {
        let records = cookbook
            .recipes()
            .iter()
            .enumerate()
            .map(|(index, recipe)| self.encode_record(recipe, Location::recipe(index)))
            .collect::<Result<Vec<_>>>()?;

        let text = records.join("\n");
        tracing::debug!(
            "Encoded {} recipes as delimited text ({:?} layout, {} bytes)",
            records.len(),
            self.layout,
            text.len()
        );
        Ok(text.into_bytes())
    }

    fn decode_cookbook(&self, bytes: &[u8]) -> Result<Cookbook> {
        let text = decode_text(bytes)?;
        let mut cookbook = Cookbook::new(self.cookbook_name.clone());

        for (index, raw) in self.split_records(text)?.iter().enumerate() {
            let recipe = self.decode_record(raw, Location::recipe(index))?;
            push_recipe(
                &mut cookbook,
                recipe,
                Location::recipe(index).at_line(raw.header.1),
            )?;
        }

        tracing::debug!(
            "Decoded {} recipes from delimited text ({:?} layout)",
            cookbook.len(),
            self.layout
        );
        Ok(cookbook)
    }

    fn encode_recipe(&self, recipe: &Recipe) -> Result<Vec<u8>> {
        Ok(self
            .encode_record(recipe, Location::document())?
            .into_bytes())
    }

    fn decode_recipe(&self, bytes: &[u8]) -> Result<Recipe> {
        let text = decode_text(bytes)?;
        let records = self.split_records(text)?;
        match records.as_slice() {
            [raw] => self.decode_record(raw, Location::document()),
            [] => Err(CookbookError::format(
                Location::document(),
                "expected one record, found none",
            )),
            _ => Err(CookbookError::format(
                Location::document(),
                format!("expected one record, found {}", records.len()),
            )),
        }
    }
}

/// Fails when `value` contains a reserved separator, a line break, or an
/// extra token reserved by the current layout.
fn check_representable(
    value: &str,
    separators: &[&str],
    layout_tokens: &[&str],
    location: Location,
) -> Result<()> {
    let reserved = separators
        .iter()
        .chain(layout_tokens)
        .chain(LINE_BREAKS.iter())
        .find(|token| value.contains(**token));

    match reserved {
        Some(token) => Err(CookbookError::encoding(
            location,
            format!(
                "'{}' is reserved in the delimited format and cannot appear in this field",
                token.escape_debug()
            ),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    fn cake() -> Recipe {
        Recipe::new("Cake", 1)
            .with_description("Recipe for cake")
            .with_ingredient(Ingredient::new("Flour", 200.0, "g"))
            .with_ingredient(Ingredient::new("Egg", 2.0, "stk"))
    }

    fn cookbook_of(recipes: Vec<Recipe>) -> Cookbook {
        let mut cookbook = Cookbook::new(DEFAULT_COOKBOOK_NAME);
        for recipe in recipes {
            cookbook.add_recipe(recipe).unwrap();
        }
        cookbook
    }

    fn decode(text: &str) -> Result<Cookbook> {
        DelimitedCodec::new().decode_cookbook(text.as_bytes())
    }

    #[test]
    fn test_encode_lines_layout() {
        let cookbook = cookbook_of(vec![
            cake(),
            Recipe::new("Kakao", 2).with_ingredient(Ingredient::new("Kakao", 1.5, "dl")),
        ]);
        let bytes = DelimitedCodec::new().encode_cookbook(&cookbook).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Cake;1\nFlour;200.0;g&Egg;2.0;stk&\nRecipe for cake\nKakao;2\nKakao;1.5;dl&\n"
        );
    }

    #[test]
    fn test_encode_sentinel_layout() {
        let codec = DelimitedCodec::new().with_layout(DelimitedLayout::Sentinel);
        let cookbook = cookbook_of(vec![cake(), Recipe::new("Toast", 1)]);
        let text = String::from_utf8(codec.encode_cookbook(&cookbook).unwrap()).unwrap();

        assert_eq!(
            text,
            "Cake;1/nFlour;200.0;g&Egg;2.0;stk&/nRecipe for cake\nToast;1/n/n"
        );
        assert_eq!(codec.decode_cookbook(text.as_bytes()).unwrap(), cookbook);
    }

    #[test]
    fn test_no_separator_after_last_record() {
        let bytes = DelimitedCodec::new()
            .encode_cookbook(&cookbook_of(vec![cake()]))
            .unwrap();
        assert!(!bytes.ends_with(b"\n"));
        assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 2);
    }

    #[test]
    fn test_empty_cookbook_encodes_to_nothing() {
        let codec = DelimitedCodec::new().with_cookbook_name("Tom");
        let bytes = codec.encode_cookbook(&Cookbook::new("Tom")).unwrap();
        assert!(bytes.is_empty());

        let decoded = codec.decode_cookbook(&bytes).unwrap();
        assert_eq!(decoded.name(), "Tom");
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_trailing_ingredient_separator() {
        let cookbook = decode("Cake;2\nFlour;200.0;g&Egg;2;stk&\nMix").unwrap();
        let ingredients = cookbook.recipes()[0].ingredients();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[1], Ingredient::new("Egg", 2.0, "stk"));

        let cookbook = decode("Cake;2\nFlour;200.0;g&Egg;2;stk\nMix").unwrap();
        assert_eq!(cookbook.recipes()[0].ingredients().len(), 2);
    }

    #[test]
    fn test_empty_ingredient_line_and_description() {
        let cookbook = decode("Water;1\n\n").unwrap();
        let recipe = &cookbook.recipes()[0];
        assert!(recipe.ingredients().is_empty());
        assert_eq!(recipe.description(), "");
    }

    #[test]
    fn test_empty_unit_is_kept() {
        let cookbook = decode("Toast;1\nBread;2.0;&\n").unwrap();
        assert_eq!(cookbook.recipes()[0].ingredients()[0].unit(), "");
    }

    #[test]
    fn test_zero_portions_is_format_error() {
        let err = decode("Cake;0\n\n").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);
        assert_eq!(
            err.location(),
            Some(&Location::recipe(0).field("Portions").at_line(1))
        );
    }

    #[test]
    fn test_header_field_count() {
        let err = decode("Cake\n\n").unwrap_err();
        assert!(err.to_string().contains("found 1"));

        let err = decode("Cake;1;extra\n\n").unwrap_err();
        assert!(err.to_string().contains("found 3"));

        let err = decode("Cake;many\n\n").unwrap_err();
        assert_eq!(err.location().unwrap().field, Some("Portions"));
    }

    #[test]
    fn test_bad_amount_reports_ingredient() {
        let err = decode("Cake;1\n\n\nPie;2\nFlour;1;kg&Egg;two;&\n").unwrap_err();
        assert_eq!(
            err.location(),
            Some(&Location::recipe(1).ingredient(1).field("Amount").at_line(5))
        );

        let err = decode("Cake;1\nFlour;NaN;kg&\n").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);
    }

    #[test]
    fn test_ingredient_field_count() {
        let err = decode("Cake;1\nFlour;200.0&\n").unwrap_err();
        assert_eq!(err.location().unwrap().ingredient, Some(0));

        // An empty token between separators is not the trailing one.
        let err = decode("Cake;1\nFlour;1;g&&Egg;1;&\n").unwrap_err();
        assert_eq!(err.location().unwrap().ingredient, Some(1));
    }

    #[test]
    fn test_truncated_record_is_error() {
        let err = decode("Cake;1").unwrap_err();
        assert!(err.to_string().contains("truncated"));

        let err = decode("Cake;1\nFlour;1;g&\nMix\nPie;2\n").unwrap_err();
        assert_eq!(err.location().unwrap().recipe, Some(1));
    }

    #[test]
    fn test_legacy_trailing_newline_is_tolerated() {
        let cookbook = decode("Cake;1\nFlour;200.0;g&\nMix\n").unwrap();
        assert_eq!(cookbook.len(), 1);
        assert_eq!(cookbook.recipes()[0].description(), "Mix");

        let codec = DelimitedCodec::new().with_layout(DelimitedLayout::Sentinel);
        let cookbook = codec
            .decode_cookbook(b"Cake;1/nFlour;200.0;g&/nMix\nPie;2/n/nBake\n")
            .unwrap();
        assert_eq!(cookbook.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let cookbook = decode("Cake;1\r\nFlour;200.0;g&\r\nMix").unwrap();
        assert_eq!(cookbook.recipes()[0].ingredients()[0].unit(), "g");
        assert_eq!(cookbook.recipes()[0].description(), "Mix");
    }

    #[test]
    fn test_description_keeps_separators() {
        let recipe = Recipe::new("Cake", 1).with_description("Mix; then bake & serve /n enjoy");
        let codec = DelimitedCodec::new();
        let bytes = codec.encode_cookbook(&cookbook_of(vec![recipe.clone()])).unwrap();
        assert_eq!(codec.decode_cookbook(&bytes).unwrap().recipes()[0], recipe);
    }

    #[test]
    fn test_reserved_characters_are_encoding_errors() {
        let codec = DelimitedCodec::new();

        let err = codec
            .encode_cookbook(&cookbook_of(vec![Recipe::new("Fish;chips", 1)]))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Encoding);
        assert_eq!(err.location(), Some(&Location::recipe(0).field("Name")));

        let recipe = Recipe::new("Cake", 1).with_ingredient(Ingredient::new("Salt", 1.0, "pinch&dash"));
        let err = codec.encode_cookbook(&cookbook_of(vec![recipe])).unwrap_err();
        assert_eq!(
            err.location(),
            Some(&Location::recipe(0).ingredient(0).field("Unit"))
        );

        let recipe = Recipe::new("Cake", 1).with_description("two\nlines");
        let err = codec.encode_cookbook(&cookbook_of(vec![recipe])).unwrap_err();
        assert_eq!(err.location(), Some(&Location::recipe(0).field("Description")));

        let sentinel = DelimitedCodec::new().with_layout(DelimitedLayout::Sentinel);
        let err = sentinel
            .encode_cookbook(&cookbook_of(vec![Recipe::new("a/nb", 1)]))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Encoding);
    }

    #[test]
    fn test_encode_rejects_values_decode_would_refuse() {
        for layout in [DelimitedLayout::Lines, DelimitedLayout::Sentinel] {
            let codec = DelimitedCodec::new().with_layout(layout);

            let err = codec
                .encode_cookbook(&cookbook_of(vec![cake(), Recipe::new("Pie", 0)]))
                .unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Encoding);
            assert_eq!(err.location(), Some(&Location::recipe(1).field("Portions")));

            let err = codec
                .encode_cookbook(&cookbook_of(vec![Recipe::new("", 1)]))
                .unwrap_err();
            assert_eq!(err.location(), Some(&Location::recipe(0).field("Name")));

            let err = codec
                .encode_recipe(&cake().with_ingredient(Ingredient::new("", 1.0, "dl")))
                .unwrap_err();
            assert_eq!(
                err.location(),
                Some(&Location::document().ingredient(2).field("Name"))
            );
        }
    }

    #[test]
    fn test_reject_lossy() {
        let labeled = Recipe::new("Cake", 1).with_label("Breakfast");
        let cookbook = cookbook_of(vec![labeled]);

        assert!(DelimitedCodec::new().encode_cookbook(&cookbook).is_ok());
        let err = DelimitedCodec::new()
            .with_reject_lossy(true)
            .encode_cookbook(&cookbook)
            .unwrap_err();
        assert_eq!(err.location(), Some(&Location::recipe(0).field("Label")));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = decode("Cake;1\n\n\nCake;2\n\n").unwrap_err();
        assert_eq!(err.location(), Some(&Location::recipe(1).field("Name").at_line(4)));
    }

    #[test]
    fn test_single_recipe() {
        let codec = DelimitedCodec::new();
        let bytes = codec.encode_recipe(&cake()).unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "Cake;1\nFlour;200.0;g&Egg;2.0;stk&\nRecipe for cake"
        );
        assert_eq!(codec.decode_recipe(&bytes).unwrap(), cake());

        assert!(codec.decode_recipe(b"").is_err());
        assert!(codec.decode_recipe(b"A;1\n\n\nB;1\n\n").is_err());
    }
}
