use serde::{Deserialize, Serialize};

use crate::components::{BuildingInstance, ResourceKind, ResourceMap, Terrain};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingMode {
    pub id: String,
    pub name: String,
    pub production: ResourceMap,
    pub consumption: ResourceMap,
    pub production_cycle: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingType {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub production: ResourceMap,
    pub consumption: ResourceMap,
    pub production_cycle: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<BuildingMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terrain_bonus: Vec<Terrain>,
}

impl BuildingType {
    pub fn mode(&self, mode_id: &str) -> Option<&BuildingMode> {
        self.modes.iter().find(|mode| mode.id == mode_id)
    }

    /// Mode a freshly placed instance starts in.
    pub fn default_mode(&self) -> Option<&BuildingMode> {
        self.modes.first()
    }
}

/// Production, consumption and cycle in effect for one placed building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRecipe<'a> {
    pub production: &'a ResourceMap,
    pub consumption: &'a ResourceMap,
    pub cycle: u32,
}

/// Read-only table of building types, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    buildings: Vec<BuildingType>,
}

impl Catalog {
    pub fn new(buildings: Vec<BuildingType>) -> Self {
        Self { buildings }
    }

    pub fn definition(&self, type_id: &str) -> Option<&BuildingType> {
        self.buildings.iter().find(|def| def.id == type_id)
    }

    /// Resolves the recipe an instance runs. A selected mode that exists on
    /// the type wins over the base triple; an unknown type yields `None`.
    pub fn resolve(&self, instance: &BuildingInstance) -> Option<ActiveRecipe<'_>> {
        let def = self.definition(&instance.type_id)?;
        let mode = instance
            .mode_id
            .as_deref()
            .and_then(|mode_id| def.mode(mode_id));
        Some(match mode {
            Some(mode) => ActiveRecipe {
                production: &mode.production,
                consumption: &mode.consumption,
                cycle: mode.production_cycle,
            },
            None => ActiveRecipe {
                production: &def.production,
                consumption: &def.consumption,
                cycle: def.production_cycle,
            },
        })
    }

    pub fn standard() -> Self {
        use ResourceKind::*;
        use Terrain::*;

        Self::new(vec![
            building("woodcutter", "Madeireira", 150.0, &[(Wood, 10.0)], &[], 1, &[Forests]),
            building("iron_mine", "Mina de Ferro", 200.0, &[(Iron, 20.0)], &[], 1, &[Mountains]),
            building("quarry", "Pedreira", 120.0, &[(Stone, 20.0)], &[], 1, &[Mountains]),
            building("salt_mine", "Mina de Sal", 180.0, &[(Salt, 1.0)], &[], 1, &[Mountains]),
            building(
                "charcoal_kiln",
                "Forno de Carvão",
                220.0,
                &[(Coal, 5.0)],
                &[(Wood, 10.0)],
                3,
                &[Mountains],
            ),
            building("wheat_field", "Campo de Trigo", 100.0, &[(Wheat, 50.0)], &[], 1, &[Plains]),
            building(
                "sugar_field",
                "Campo de Cana",
                130.0,
                &[(SugarCane, 50.0)],
                &[],
                1,
                &[Plains],
            ),
            building("mill", "Moinho", 300.0, &[(Flour, 1.0)], &[(Wheat, 100.0)], 5, &[]),
            building(
                "sugar_refinery",
                "Refinaria de Açúcar",
                350.0,
                &[(Sugar, 1.0)],
                &[(SugarCane, 100.0), (Coal, 10.0)],
                1,
                &[],
            ),
            building("chicken_coop", "Galinheiro", 150.0, &[(Eggs, 5.0)], &[], 1, &[Pastures]),
            building("stable", "Estábulo", 250.0, &[(Milk, 2.0)], &[], 1, &[Pastures]),
            BuildingType {
                modes: vec![
                    mode("cheese", "Queijo", &[(Cheese, 1.0)], &[(Milk, 100.0), (Salt, 5.0)], 10),
                    mode("butter", "Manteiga", &[(Butter, 1.0)], &[(Milk, 50.0), (Salt, 2.0)], 9),
                ],
                ..building("dairy_factory", "Fábrica de Laticínios", 400.0, &[], &[], 1, &[])
            },
            BuildingType {
                modes: vec![
                    mode("beams", "Vigas", &[(IronBeams, 1.0)], &[(Iron, 200.0), (Coal, 50.0)], 10),
                    mode("nails", "Pregos", &[(Nails, 10.0)], &[(Iron, 50.0), (Coal, 50.0)], 6),
                ],
                ..building("steel_mill", "Usina Siderúrgica", 500.0, &[], &[], 1, &[])
            },
            building(
                "bakery",
                "Padaria",
                600.0,
                &[(Cake, 1.0)],
                &[
                    (Butter, 20.0),
                    (Milk, 50.0),
                    (Sugar, 50.0),
                    (Eggs, 20.0),
                    (Flour, 100.0),
                    (Coal, 20.0),
                ],
                15,
                &[],
            ),
            building("bank", "Banco", 800.0, &[], &[], 1, &[]),
        ])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn building(
    id: &str,
    name: &str,
    cost: f64,
    production: &[(ResourceKind, f64)],
    consumption: &[(ResourceKind, f64)],
    production_cycle: u32,
    terrain_bonus: &[Terrain],
) -> BuildingType {
    BuildingType {
        id: id.to_string(),
        name: name.to_string(),
        cost,
        production: production.iter().copied().collect(),
        consumption: consumption.iter().copied().collect(),
        production_cycle,
        modes: Vec::new(),
        terrain_bonus: terrain_bonus.to_vec(),
    }
}

fn mode(
    id: &str,
    name: &str,
    production: &[(ResourceKind, f64)],
    consumption: &[(ResourceKind, f64)],
    production_cycle: u32,
) -> BuildingMode {
    BuildingMode {
        id: id.to_string(),
        name: name.to_string(),
        production: production.iter().copied().collect(),
        consumption: consumption.iter().copied().collect(),
        production_cycle,
    }
}
