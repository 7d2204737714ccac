// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The eight-ingredient recipe, the reference ("perfect") recipe and parsing
//! of on-ledger recipe records.

use pho_ledger_client::ObjectData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One of the eight recipe quantities, in contract argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ingredient {
    /// Broth quality.
    BrothQuality,
    /// Noodle thickness.
    NoodleThickness,
    /// Beef brisket amount.
    BeefBrisket,
    /// Basil amount.
    Basil,
    /// Cilantro amount.
    Cilantro,
    /// Mint amount.
    Mint,
    /// Star anise amount.
    StarAnise,
    /// Cinnamon amount.
    Cinnamon,
}

impl Ingredient {
    /// All ingredients in contract argument order.
    pub const ALL: [Self; 8] = [
        Self::BrothQuality,
        Self::NoodleThickness,
        Self::BeefBrisket,
        Self::Basil,
        Self::Cilantro,
        Self::Mint,
        Self::StarAnise,
        Self::Cinnamon,
    ];

    /// Field name inside the on-ledger `Pho` struct.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::BrothQuality => "broth_quality",
            Self::NoodleThickness => "noodle_thickness",
            Self::BeefBrisket => "beef_brisket",
            Self::Basil => "basil",
            Self::Cilantro => "cilantro",
            Self::Mint => "mint",
            Self::StarAnise => "star_anise",
            Self::Cinnamon => "cinnamon",
        }
    }

    /// Human label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BrothQuality => "Broth Quality",
            Self::NoodleThickness => "Noodle Thickness",
            Self::BeefBrisket => "Beef Brisket",
            Self::Basil => "Basil",
            Self::Cilantro => "Cilantro",
            Self::Mint => "Mint",
            Self::StarAnise => "Star Anise",
            Self::Cinnamon => "Cinnamon",
        }
    }

    /// Short name used when quoting the reference recipe.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::BrothQuality => "broth",
            Self::NoodleThickness => "noodle",
            Self::BeefBrisket => "beef",
            other => other.field_name(),
        }
    }

    /// Position in [`Ingredient::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Eight ingredient quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Recipe {
    /// Broth quality.
    pub broth_quality: u16,
    /// Noodle thickness.
    pub noodle_thickness: u16,
    /// Beef brisket amount.
    pub beef_brisket: u16,
    /// Basil amount.
    pub basil: u16,
    /// Cilantro amount.
    pub cilantro: u16,
    /// Mint amount.
    pub mint: u16,
    /// Star anise amount.
    pub star_anise: u16,
    /// Cinnamon amount.
    pub cinnamon: u16,
}

/// The recipe the contract rewards. The contract is the authority; the client
/// only quotes it in messages and hints.
pub const PERFECT_RECIPE: Recipe = Recipe::from_array([10, 2, 70, 30, 25, 15, 2, 1]);

impl Recipe {
    /// Build from values in [`Ingredient::ALL`] order.
    pub const fn from_array(v: [u16; 8]) -> Self {
        Self {
            broth_quality: v[0],
            noodle_thickness: v[1],
            beef_brisket: v[2],
            basil: v[3],
            cilantro: v[4],
            mint: v[5],
            star_anise: v[6],
            cinnamon: v[7],
        }
    }

    /// Values in [`Ingredient::ALL`] order.
    pub const fn to_array(&self) -> [u16; 8] {
        [
            self.broth_quality,
            self.noodle_thickness,
            self.beef_brisket,
            self.basil,
            self.cilantro,
            self.mint,
            self.star_anise,
            self.cinnamon,
        ]
    }

    /// Quantity of one ingredient.
    pub const fn get(&self, ingredient: Ingredient) -> u16 {
        self.to_array()[ingredient.index()]
    }

    /// Set one ingredient.
    pub fn set(&mut self, ingredient: Ingredient, value: u16) {
        let mut v = self.to_array();
        v[ingredient.index()] = value;
        *self = Self::from_array(v);
    }

    /// UX hint only; never used to gate a call.
    pub fn is_perfect(&self) -> bool {
        *self == PERFECT_RECIPE
    }

    /// `name=value` pairs, e.g. `broth=10, noodle=2, …`.
    pub fn describe(&self) -> String {
        Ingredient::ALL
            .iter()
            .map(|i| format!("{}={}", i.short_name(), self.get(*i)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Extract the recipe from a fetched record object.
///
/// Expects `content.dataType == "moveObject"` and a nested `pho` struct under
/// `content.fields`. The nested struct is accepted both bare and wrapped as
/// `{ "type": …, "fields": { … } }`, and quantities both as JSON numbers and
/// as numeric strings. Anything else yields `None`.
pub fn parse_record(data: &ObjectData) -> Option<Recipe> {
    let Some(content) = data.content.as_ref() else {
        debug!(object = %data.object_id, "record has no content");
        return None;
    };
    let data_type = content.get("dataType").and_then(Value::as_str);
    if data_type != Some("moveObject") {
        debug!(object = %data.object_id, ?data_type, "record is not a moveObject");
        return None;
    }
    let Some(pho) = content
        .get("fields")
        .and_then(|f| f.get("pho"))
        .and_then(struct_fields)
    else {
        debug!(object = %data.object_id, "no pho fields in record");
        return None;
    };

    let mut values = [0u16; 8];
    for (slot, ingredient) in values.iter_mut().zip(Ingredient::ALL) {
        let Some(v) = pho.get(ingredient.field_name()).and_then(as_u16) else {
            debug!(
                object = %data.object_id,
                field = ingredient.field_name(),
                "missing or malformed ingredient"
            );
            return None;
        };
        *slot = v;
    }
    Some(Recipe::from_array(values))
}

fn struct_fields(value: &Value) -> Option<&Map<String, Value>> {
    let obj = value.as_object()?;
    match obj.get("fields").and_then(Value::as_object) {
        Some(inner) => Some(inner),
        None => Some(obj),
    }
}

fn as_u16(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
