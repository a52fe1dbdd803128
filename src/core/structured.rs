use crate::core::{
    check_encodable, check_ingredient_name, check_recipe_name, decode_text, narrow_portions,
    push_recipe, Codec, Cookbook, DecodeOptions, Ingredient, Recipe,
};
use crate::utils::error::{CookbookError, Location, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the decoder does with a recipe that has no `Favorite` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFavorite {
    /// Absence is a format error.
    #[default]
    Reject,
    /// Absence means "not a favorite".
    DefaultFalse,
}

/// JSON codec with the `Name` / `Recipes` / `Ingredients` document shape.
#[derive(Debug, Clone, Default)]
pub struct StructuredCodec {
    missing_favorite: MissingFavorite,
    pretty: bool,
    options: DecodeOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CookbookDocument<'a> {
    name: &'a str,
    recipes: Vec<RecipeDocument<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RecipeDocument<'a> {
    name: &'a str,
    favorite: bool,
    label: &'a str,
    portions: u32,
    description: &'a str,
    ingredients: Vec<IngredientDocument<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct IngredientDocument<'a> {
    name: &'a str,
    amount: f64,
    unit: &'a str,
}

impl StructuredCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_favorite(mut self, policy: MissingFavorite) -> Self {
        self.missing_favorite = policy;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    fn to_bytes<T: Serialize>(&self, document: &T) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        bytes.map_err(|e| CookbookError::encoding(Location::document(), e.to_string()))
    }

    fn parse(&self, bytes: &[u8]) -> Result<Value> {
        let text = decode_text(bytes)?;
        serde_json::from_str(text).map_err(|e| {
            CookbookError::format(Location::line(e.line()), format!("invalid JSON: {}", e))
        })
    }

    fn decode_recipe_value(&self, value: &Value, location: Location) -> Result<Recipe> {
        let object = as_object(value, &location)?;

        let name = required_str(object, "Name", &location)?;
        check_recipe_name(name, &location.clone().field("Name"))?;

        let favorite = match object.get("Favorite") {
            None | Some(Value::Null) => match self.missing_favorite {
                MissingFavorite::Reject => {
                    return Err(CookbookError::format(
                        location.field("Favorite"),
                        "missing required field",
                    ))
                }
                MissingFavorite::DefaultFalse => false,
            },
            Some(Value::Bool(favorite)) => *favorite,
            Some(other) => {
                return Err(wrong_kind(&location.field("Favorite"), "a boolean", other));
            }
        };

        let label = required_str(object, "Label", &location)?;
        let portions = required_portions(object, &location)?;
        let description = required_str(object, "Description", &location)?;
        let ingredients = required_array(object, "Ingredients", &location)?;

        let mut recipe = Recipe::new(name, portions)
            .with_description(description)
            .with_label(label)
            .with_favorite(favorite);

        for (index, node) in ingredients.iter().enumerate() {
            let ingredient =
                self.decode_ingredient_value(node, location.clone().ingredient(index))?;
            recipe.add_ingredient(ingredient);
        }

        Ok(recipe)
    }

    fn decode_ingredient_value(&self, value: &Value, location: Location) -> Result<Ingredient> {
        let object = as_object(value, &location)?;

        let name = required_str(object, "Name", &location)?;
        check_ingredient_name(name, &location.clone().field("Name"))?;

        let amount_location = location.clone().field("Amount");
        let amount = match required(object, "Amount", &location)? {
            Value::Number(number) => number.as_f64().ok_or_else(|| {
                CookbookError::format(
                    amount_location.clone(),
                    format!("amount {} is not representable as a decimal", number),
                )
            })?,
            other => return Err(wrong_kind(&amount_location, "a number", other)),
        };
        let amount = self.options.check_amount(amount, &amount_location)?;

        let unit = required_str(object, "Unit", &location)?;

        Ok(Ingredient::new(name, amount, unit))
    }
}

impl Codec for StructuredCodec {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn encode_cookbook(&self, cookbook: &Cookbook) -> Result<Vec<u8>> {
        let recipes = cookbook
            .recipes()
            .iter()
            .enumerate()
            .map(|(index, recipe)| recipe_document(recipe, Location::recipe(index)))
            .collect::<Result<Vec<_>>>()?;

        let bytes = self.to_bytes(&CookbookDocument {
            name: cookbook.name(),
            recipes,
        })?;

        tracing::debug!(
            "Encoded cookbook '{}' with {} recipes as JSON ({} bytes)",
            cookbook.name(),
            cookbook.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn decode_cookbook(&self, bytes: &[u8]) -> Result<Cookbook> {
        let root = self.parse(bytes)?;
        let location = Location::document();
        let object = as_object(&root, &location)?;

        let name = required_str(object, "Name", &location)?;
        let recipes = required_array(object, "Recipes", &location)?;

        let mut cookbook = Cookbook::new(name);
        for (index, node) in recipes.iter().enumerate() {
            let recipe = self.decode_recipe_value(node, Location::recipe(index))?;
            push_recipe(&mut cookbook, recipe, Location::recipe(index))?;
        }

        tracing::debug!(
            "Decoded cookbook '{}' with {} recipes from JSON",
            cookbook.name(),
            cookbook.len()
        );
        Ok(cookbook)
    }

    fn encode_recipe(&self, recipe: &Recipe) -> Result<Vec<u8>> {
        let document = recipe_document(recipe, Location::document())?;
        self.to_bytes(&document)
    }

    fn decode_recipe(&self, bytes: &[u8]) -> Result<Recipe> {
        let root = self.parse(bytes)?;
        self.decode_recipe_value(&root, Location::document())
    }
}

fn recipe_document<'a>(recipe: &'a Recipe, location: Location) -> Result<RecipeDocument<'a>> {
    check_encodable(recipe, &location)?;

    let ingredients = recipe
        .ingredients()
        .iter()
        .enumerate()
        .map(|(index, ingredient)| {
            if !ingredient.amount().is_finite() {
                return Err(CookbookError::encoding(
                    location.clone().ingredient(index).field("Amount"),
                    format!(
                        "amount {} has no JSON number representation",
                        ingredient.amount()
                    ),
                ));
            }
            Ok(IngredientDocument {
                name: ingredient.name(),
                amount: ingredient.amount(),
                unit: ingredient.unit(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RecipeDocument {
        name: recipe.name(),
        favorite: recipe.is_favorite(),
        label: recipe.label(),
        portions: recipe.portions(),
        description: recipe.description(),
        ingredients,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn wrong_kind(location: &Location, expected: &str, found: &Value) -> CookbookError {
    CookbookError::format(
        location.clone(),
        format!("expected {}, found {}", expected, kind_of(found)),
    )
}

fn as_object<'v>(value: &'v Value, location: &Location) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| wrong_kind(location, "an object", value))
}

/// Looks up a key that must be present and non-null.
fn required<'v>(
    object: &'v Map<String, Value>,
    key: &'static str,
    location: &Location,
) -> Result<&'v Value> {
    object
        .get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| CookbookError::format(location.clone().field(key), "missing required field"))
}

fn required_str<'v>(
    object: &'v Map<String, Value>,
    key: &'static str,
    location: &Location,
) -> Result<&'v str> {
    let value = required(object, key, location)?;
    value
        .as_str()
        .ok_or_else(|| wrong_kind(&location.clone().field(key), "a string", value))
}

fn required_array<'v>(
    object: &'v Map<String, Value>,
    key: &'static str,
    location: &Location,
) -> Result<&'v Vec<Value>> {
    let value = required(object, key, location)?;
    value
        .as_array()
        .ok_or_else(|| wrong_kind(&location.clone().field(key), "an array", value))
}

fn required_portions(object: &Map<String, Value>, location: &Location) -> Result<u32> {
    let value = required(object, "Portions", location)?;
    let field = location.clone().field("Portions");

    if let Some(portions) = value.as_i64() {
        narrow_portions(portions, &field)
    } else if let Some(portions) = value.as_u64() {
        // Above i64::MAX, so certainly out of range.
        Err(CookbookError::format(
            field,
            format!("portions {} is out of range (max {})", portions, u32::MAX),
        ))
    } else if value.is_number() {
        Err(CookbookError::format(
            field,
            format!("expected an integer, found {}", value),
        ))
    } else {
        Err(wrong_kind(&field, "an integer", value))
    }
}
