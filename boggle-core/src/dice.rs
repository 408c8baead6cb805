use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use boggle_types::Board;

pub const DEFAULT_VOWEL_PROPORTION: f64 = 0.375;

/// Re-rolls with too few vowels are rejected up to this many times before
/// the last roll is accepted anyway, so a vowel-poor dice set cannot hang
/// the server.
const MAX_ROLL_ATTEMPTS: u32 = 1000;

const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

/// One named dice set: each die is a list of 1-2 letter faces (a face such
/// as "QU" produces a digraph tile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceConfig {
    pub name: String,
    pub dice: Vec<Vec<String>>,
}

impl DiceConfig {
    /// The 16-die set of the 1992 edition. The Q die carries a QU face that
    /// lands on the board as a two-letter tile.
    pub fn classic() -> Self {
        let faces = [
            "A A E E G N",
            "A B B J O O",
            "A C H O P S",
            "A F F K P S",
            "A O O T T W",
            "C I M O T U",
            "D E I L R X",
            "D E L R V Y",
            "D I S T T Y",
            "E E G H N W",
            "E E I N S U",
            "E H R T V W",
            "E I O S S T",
            "E L R T T Y",
            "H I M N QU U",
            "H L N N R Z",
        ];
        Self {
            name: "classic".to_string(),
            dice: faces
                .iter()
                .map(|die| die.split_whitespace().map(str::to_string).collect())
                .collect(),
        }
    }

    pub fn num_dice(&self) -> usize {
        self.dice.len()
    }

    /// Board dimensions for this set: explicit `dims` must match the die
    /// count; otherwise the count must be a perfect square.
    pub fn board_dims(&self, dims: Option<(usize, usize)>) -> Result<(usize, usize)> {
        let num_dice = self.num_dice();
        match dims {
            Some((rows, cols)) => {
                if rows * cols != num_dice {
                    bail!(
                        "board dimensions {}x{} not compatible with {} dice",
                        rows,
                        cols,
                        num_dice
                    );
                }
                Ok((rows, cols))
            }
            None => {
                let side = (num_dice as f64).sqrt().round() as usize;
                if side * side != num_dice {
                    bail!(
                        "{} dice is not a perfect square; set board dimensions explicitly",
                        num_dice
                    );
                }
                Ok((side, side))
            }
        }
    }
}

/// Roll a board from a dice set. The same seed always yields the same
/// board, so a round's grid can be re-derived instead of stored.
///
/// Dice are dealt in shuffled order, one face picked per die; boards whose
/// vowel ratio falls below `vowel_proportion` are re-rolled.
pub fn roll(
    seed: u64,
    config: &DiceConfig,
    dims: Option<(usize, usize)>,
    vowel_proportion: f64,
) -> Result<Board> {
    let (rows, cols) = config.board_dims(dims)?;
    let num_dice = config.num_dice();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut flat: Vec<String> = Vec::with_capacity(num_dice);
    for attempt in 0.. {
        let mut dice: Vec<&Vec<String>> = config.dice.iter().collect();
        dice.shuffle(&mut rng);
        flat = dice
            .iter()
            .map(|die| {
                die.choose(&mut rng)
                    .map(|face| face.to_uppercase())
                    .unwrap_or_default()
            })
            .collect();

        let vowels = flat
            .iter()
            .filter(|tile| tile.chars().next().is_some_and(|ch| VOWELS.contains(&ch)))
            .count();
        if vowels as f64 / num_dice as f64 >= vowel_proportion {
            break;
        }
        if attempt >= MAX_ROLL_ATTEMPTS {
            warn!(
                "Dice set {} failed to meet vowel proportion {} after {} rolls",
                config.name, vowel_proportion, attempt
            );
            break;
        }
    }

    let tiles: Vec<Vec<String>> = (0..rows)
        .map(|row| flat[row * cols..(row + 1) * cols].to_vec())
        .collect();
    Ok(Board::new(tiles))
}

/// Named dice sets discovered from a directory of `.dice` files.
///
/// File format: entries separated by blank lines. The first line of an
/// entry is the set name, each following line one die with its faces
/// whitespace-separated.
#[derive(Debug, Default)]
pub struct DiceConfigRegistry {
    configs: BTreeMap<String, Arc<DiceConfig>>,
}

impl DiceConfigRegistry {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("cannot read dice directory {}", dir.display()))?;

        let mut configs = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("dice") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    for config in Self::parse(&contents) {
                        info!(
                            "Loaded dice set {} ({} dice)",
                            config.name,
                            config.num_dice()
                        );
                        configs.insert(config.name.clone(), Arc::new(config));
                    }
                }
                Err(err) => {
                    warn!("Failed to read dice file {}: {}", path.display(), err);
                }
            }
        }
        Ok(Self { configs })
    }

    pub fn parse(contents: &str) -> Vec<DiceConfig> {
        let mut configs = Vec::new();
        let mut name: Option<String> = None;
        let mut dice: Vec<Vec<String>> = Vec::new();

        for line in contents.lines().map(str::trim).chain(std::iter::once("")) {
            if line.is_empty() {
                if let Some(name) = name.take()
                    && !dice.is_empty()
                {
                    configs.push(DiceConfig {
                        name,
                        dice: std::mem::take(&mut dice),
                    });
                }
                dice.clear();
            } else if name.is_none() {
                name = Some(line.to_string());
            } else {
                dice.push(
                    line.split_whitespace()
                        .map(|face| face.to_uppercase())
                        .collect(),
                );
            }
        }
        configs
    }

    pub fn from_configs(configs: impl IntoIterator<Item = DiceConfig>) -> Self {
        Self {
            configs: configs
                .into_iter()
                .map(|config| (config.name.clone(), Arc::new(config)))
                .collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.configs.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<DiceConfig>> {
        self.configs.get(name).cloned()
    }

    /// Default set when a session does not name one: sole entry, else the
    /// classic set if present.
    pub fn default_config(&self) -> Option<Arc<DiceConfig>> {
        if self.configs.len() == 1 {
            self.configs.values().next().cloned()
        } else {
            self.get("classic")
        }
    }
}
