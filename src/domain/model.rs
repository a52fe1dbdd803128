use crate::utils::error::{CookbookError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    name: String,
    amount: f64,
    unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Free text, may be empty.
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// A named dish. The name is its identity inside a [`Cookbook`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    name: String,
    portions: u32,
    description: String,
    label: String,
    favorite: bool,
    ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, portions: u32) -> Self {
        Self {
            name: name.into(),
            portions,
            description: String::new(),
            label: String::new(),
            favorite: false,
            ingredients: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn portions(&self) -> u32 {
        self.portions
    }

    pub fn set_portions(&mut self, portions: u32) -> Result<()> {
        if portions == 0 {
            return Err(CookbookError::InvalidDomainValue {
                field: "portions",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.portions = portions;
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Empty string when the recipe is unlabeled.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn clear_label(&mut self) {
        self.label.clear();
    }

    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    pub fn set_favorite(&mut self, favorite: bool) {
        self.favorite = favorite;
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        if index < self.ingredients.len() {
            Some(self.ingredients.remove(index))
        } else {
            None
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cookbook {
    name: String,
    recipes: Vec<Recipe>,
}

impl Cookbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recipes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Appends a recipe. Names are unique within a cookbook.
    pub fn add_recipe(&mut self, recipe: Recipe) -> Result<()> {
        if self.recipe(recipe.name()).is_some() {
            return Err(CookbookError::DuplicateRecipe {
                name: recipe.name().to_string(),
            });
        }
        self.recipes.push(recipe);
        Ok(())
    }

    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name() == name)
    }

    pub fn recipe_mut(&mut self, name: &str) -> Option<&mut Recipe> {
        self.recipes.iter_mut().find(|r| r.name() == name)
    }

    /// Replaces the recipe with the same name in place, keeping its position.
    /// Returns the previous version, or `None` if no recipe had that name.
    pub fn replace_recipe(&mut self, recipe: Recipe) -> Option<Recipe> {
        let slot = self.recipe_mut(recipe.name())?;
        Some(std::mem::replace(slot, recipe))
    }

    pub fn remove_recipe(&mut self, name: &str) -> Option<Recipe> {
        let index = self.recipes.iter().position(|r| r.name() == name)?;
        Some(self.recipes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cake() -> Recipe {
        Recipe::new("Cake", 1)
            .with_description("Recipe for cake")
            .with_label("Breakfast")
            .with_ingredient(Ingredient::new("Flour", 200.0, "g"))
            .with_ingredient(Ingredient::new("Egg", 2.0, "stk"))
    }

    #[test]
    fn test_new_recipe_defaults() {
        let recipe = Recipe::new("Pancakes", 4);
        assert_eq!(recipe.portions(), 4);
        assert_eq!(recipe.description(), "");
        assert!(!recipe.is_labeled());
        assert!(!recipe.is_favorite());
        assert!(recipe.ingredients().is_empty());
    }

    #[test]
    fn test_set_portions_rejects_zero() {
        let mut recipe = cake();
        assert!(recipe.set_portions(0).is_err());
        assert_eq!(recipe.portions(), 1);
        recipe.set_portions(6).unwrap();
        assert_eq!(recipe.portions(), 6);
    }

    #[test]
    fn test_ingredient_order_and_duplicates() {
        let mut recipe = cake();
        recipe.add_ingredient(Ingredient::new("Flour", 50.0, "g"));

        let names: Vec<&str> = recipe.ingredients().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Flour", "Egg", "Flour"]);

        let removed = recipe.remove_ingredient(1).unwrap();
        assert_eq!(removed.name(), "Egg");
        assert!(recipe.remove_ingredient(10).is_none());
    }

    #[test]
    fn test_cookbook_rejects_duplicate_names() {
        let mut cookbook = Cookbook::new("Cookbook");
        cookbook.add_recipe(cake()).unwrap();
        let err = cookbook.add_recipe(Recipe::new("Cake", 2)).unwrap_err();
        assert!(matches!(err, CookbookError::DuplicateRecipe { .. }));
        assert_eq!(cookbook.len(), 1);
    }

    #[test]
    fn test_cookbook_replace_keeps_position() {
        let mut cookbook = Cookbook::new("Cookbook");
        cookbook.add_recipe(cake()).unwrap();
        cookbook.add_recipe(Recipe::new("Kakao", 1)).unwrap();

        let previous = cookbook.replace_recipe(Recipe::new("Cake", 2)).unwrap();
        assert_eq!(previous.portions(), 1);
        assert_eq!(cookbook.recipes()[0].portions(), 2);
        assert!(cookbook.replace_recipe(Recipe::new("Missing", 1)).is_none());
    }

    #[test]
    fn test_cookbook_remove_recipe() {
        let mut cookbook = Cookbook::new("Cookbook");
        cookbook.add_recipe(cake()).unwrap();
        assert!(cookbook.remove_recipe("Cake").is_some());
        assert!(cookbook.remove_recipe("Cake").is_none());
        assert!(cookbook.is_empty());
    }
}
