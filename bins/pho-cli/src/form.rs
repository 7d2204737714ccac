// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pure state transitions for the recipe form (inputs, validation, actions).

use pho_kitchen::{Ingredient, Recipe, PERFECT_RECIPE};

/// Eight text inputs plus per-field validation messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub inputs: [String; 8],
    pub errors: [Option<String>; 8],
    /// Mirrors the adapter: actions are dropped while a transaction runs.
    pub busy: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            inputs: PERFECT_RECIPE.to_array().map(|v| v.to_string()),
            errors: Default::default(),
            busy: false,
        }
    }
}

impl FormState {
    pub fn is_valid(&self) -> bool {
        self.errors.iter().all(Option::is_none)
    }

    /// `(ingredient, message)` for every invalid field, in field order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = (Ingredient, &str)> + '_ {
        Ingredient::ALL
            .into_iter()
            .zip(&self.errors)
            .filter_map(|(i, e)| e.as_deref().map(|e| (i, e)))
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    FieldChanged(Ingredient, String),
    BusyChanged(bool),
    Submit,
    Claim,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    Cook(Recipe),
    Claim,
    ClearSession,
}

pub fn reduce(form: &FormState, ev: FormEvent) -> (FormState, Vec<FormEffect>) {
    let mut next = form.clone();
    let mut fx = Vec::new();
    match ev {
        FormEvent::FieldChanged(ingredient, text) => {
            next.errors[ingredient.index()] = None;
            next.inputs[ingredient.index()] = text;
        }
        FormEvent::BusyChanged(busy) => next.busy = busy,
        FormEvent::Submit => {
            if next.busy {
                return (next, fx);
            }
            let mut recipe = Recipe::default();
            for (ingredient, (input, error)) in Ingredient::ALL
                .into_iter()
                .zip(next.inputs.iter().zip(next.errors.iter_mut()))
            {
                match parse_quantity(input) {
                    Ok(v) => {
                        recipe.set(ingredient, v);
                        *error = None;
                    }
                    Err(msg) => *error = Some(msg),
                }
            }
            if next.is_valid() {
                fx.push(FormEffect::Cook(recipe));
            }
        }
        FormEvent::Claim => {
            if !next.busy {
                fx.push(FormEffect::Claim);
            }
        }
        FormEvent::Clear => fx.push(FormEffect::ClearSession),
    }
    (next, fx)
}

/// Accepts a whole number in `0..=65535` (surrounding whitespace ignored).
pub fn parse_quantity(text: &str) -> Result<u16, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("required".into());
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("`{text}` is not a whole number"));
    }
    text.parse::<u16>()
        .map_err(|_| format!("{text} is out of range (0-65535)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_submit_the_reference_recipe() {
        let (next, fx) = reduce(&FormState::default(), FormEvent::Submit);
        assert!(next.is_valid());
        assert_eq!(fx, vec![FormEffect::Cook(PERFECT_RECIPE)]);
    }

    #[test]
    fn edited_field_flows_into_the_recipe() {
        let form = FormState::default();
        let (form, _) = reduce(
            &form,
            FormEvent::FieldChanged(Ingredient::Mint, " 65535 ".into()),
        );
        let (_, fx) = reduce(&form, FormEvent::Submit);
        let Some(FormEffect::Cook(recipe)) = fx.first() else {
            unreachable!("submit produced {fx:?}");
        };
        assert_eq!(recipe.mint, 65535);
        assert!(!recipe.is_perfect());
    }

    #[test]
    fn invalid_inputs_block_submit_with_messages() {
        let form = FormState::default();
        let (form, _) = reduce(
            &form,
            FormEvent::FieldChanged(Ingredient::BrothQuality, "65536".into()),
        );
        let (form, _) = reduce(&form, FormEvent::FieldChanged(Ingredient::Basil, "-3".into()));
        let (form, _) = reduce(&form, FormEvent::FieldChanged(Ingredient::Cinnamon, String::new()));
        let (next, fx) = reduce(&form, FormEvent::Submit);

        assert!(fx.is_empty());
        let invalid: Vec<Ingredient> = next.invalid_fields().map(|(i, _)| i).collect();
        assert_eq!(
            invalid,
            vec![Ingredient::BrothQuality, Ingredient::Basil, Ingredient::Cinnamon]
        );

        // Fixing a field clears its message only.
        let (fixed, _) = reduce(&next, FormEvent::FieldChanged(Ingredient::Basil, "30".into()));
        assert_eq!(fixed.invalid_fields().count(), 2);
    }

    #[test]
    fn busy_drops_submit_and_claim_but_not_clear() {
        let (form, _) = reduce(&FormState::default(), FormEvent::BusyChanged(true));
        assert!(reduce(&form, FormEvent::Submit).1.is_empty());
        assert!(reduce(&form, FormEvent::Claim).1.is_empty());
        assert_eq!(reduce(&form, FormEvent::Clear).1, vec![FormEffect::ClearSession]);
    }

    #[test]
    fn quantity_bounds() {
        assert_eq!(parse_quantity("0"), Ok(0));
        assert_eq!(parse_quantity("65535"), Ok(65535));
        assert!(parse_quantity("65536").is_err());
        assert!(parse_quantity("1.5").is_err());
        assert!(parse_quantity("").is_err());
    }
}
