//! Tabulated reaction-rate, cooling-rate and adiabatic-index coefficients on a
//! log-spaced temperature grid.
//!
//! The tables are filled once by a [`TableSource`] (the file-reading
//! collaborator) and are immutable afterwards. One [`RateTableStore`] can be
//! shared read-only by every strip, so it is usually wrapped in an `Arc`.
use crate::Network::network_error::ChemistryError;
use log::info;
use std::collections::HashMap;

macro_rules! table_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const COUNT: usize = $name::ALL.len();

            /// identifier of the table in the backing store
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

table_keys! {
    /// Reaction-rate tables, cm^3/s (cm^6/s for the three-body channels).
    Reaction {
        K01 => "k01",
        K02 => "k02",
        K03 => "k03",
        K04 => "k04",
        K05 => "k05",
        K06 => "k06",
        K07 => "k07",
        K08 => "k08",
        K09 => "k09",
        K10 => "k10",
        K11 => "k11",
        K12 => "k12",
        K13 => "k13",
        K14 => "k14",
        K15 => "k15",
        K16 => "k16",
        K17 => "k17",
        K18 => "k18",
        K19 => "k19",
        K21 => "k21",
        K22 => "k22",
    }
}

table_keys! {
    /// Cooling and heating coefficient tables.
    Cooling {
        Brem => "brem_brem",
        CeHeI => "ceHeI_ceHeI",
        CeHeII => "ceHeII_ceHeII",
        CeHI => "ceHI_ceHI",
        CieCo => "cie_cooling_cieco",
        CiHeI => "ciHeI_ciHeI",
        CiHeII => "ciHeII_ciHeII",
        CiHeIS => "ciHeIS_ciHeIS",
        CiHI => "ciHI_ciHI",
        Compton => "compton_comp_",
        GammaH => "gammah_gammah",
        GaEl => "gloverabel08_gael",
        GaH2 => "gloverabel08_gaH2",
        GaHe => "gloverabel08_gaHe",
        GaHI => "gloverabel08_gaHI",
        GaHp => "gloverabel08_gaHp",
        GpHdl => "gloverabel08_gphdl",
        GpLdl => "gloverabel08_gpldl",
        H2Lte => "gloverabel08_h2lte",
        H2mCool => "h2formation_h2mcool",
        H2mHeat => "h2formation_h2mheat",
        NcrD1 => "h2formation_ncrd1",
        NcrD2 => "h2formation_ncrd2",
        NcrN => "h2formation_ncrn",
        ReHeII1 => "reHeII1_reHeII1",
        ReHeII2 => "reHeII2_reHeII2",
        ReHeIII => "reHeIII_reHeIII",
        ReHII => "reHII_reHII",
    }
}

table_keys! {
    /// Adiabatic index of the two molecular species and its temperature slope.
    GammaTable {
        GammaH2I => "gammaH2_1",
        DGammaH2IdT => "dgammaH2_1_dT",
        GammaH2II => "gammaH2_2",
        DGammaH2IIdT => "dgammaH2_2_dT",
    }
}

/// Location of a log-temperature inside the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinLocation {
    /// always in `[0, nbins-1]`, so `bin + 1` is a valid table index
    pub bin: usize,
    /// position inside the bin; slightly outside `[0, 1]` at the grid edges
    pub frac: f64,
}

/// Log-spaced temperature grid with `nbins` intervals (`nbins + 1` nodes).
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    pub t_min: f64,
    pub t_max: f64,
    pub nbins: usize,
    log_min: f64,
    dbin: f64,
    idbin: f64,
}

impl TemperatureGrid {
    pub fn new(t_min: f64, t_max: f64, nbins: usize) -> Result<Self, ChemistryError> {
        if !(t_min > 0.0 && t_max > t_min && t_max.is_finite()) {
            return Err(ChemistryError::Config(format!(
                "temperature bounds must satisfy 0 < t_min < t_max, got [{}, {}]",
                t_min, t_max
            )));
        }
        if nbins == 0 {
            return Err(ChemistryError::Config(
                "temperature grid needs at least one bin".to_string(),
            ));
        }
        let log_min = t_min.ln();
        let dbin = (t_max.ln() - log_min) / nbins as f64;
        Ok(Self {
            t_min,
            t_max,
            nbins,
            log_min,
            dbin,
            idbin: 1.0 / dbin,
        })
    }

    /// number of entries every table must have
    pub fn table_len(&self) -> usize {
        self.nbins + 1
    }

    /// width of one bin in log-temperature
    pub fn bin_width(&self) -> f64 {
        self.dbin
    }

    pub fn log_t_min(&self) -> f64 {
        self.log_min
    }

    /// log-temperature of grid node `node`
    pub fn log_node(&self, node: usize) -> f64 {
        self.log_min + node as f64 * self.dbin
    }

    /// temperatures of all grid nodes
    pub fn node_temperatures(&self) -> Vec<f64> {
        (0..self.table_len())
            .map(|n| self.log_node(n).exp())
            .collect()
    }

    pub fn clamp(&self, t: f64) -> f64 {
        if t < self.t_min {
            self.t_min
        } else if t > self.t_max {
            self.t_max
        } else {
            t
        }
    }

    /// Maps a log-temperature onto (bin, fractional offset). The bin is
    /// clamped to the table, the offset is measured from the clamped bin.
    pub fn locate(&self, log_t: f64) -> BinLocation {
        let raw = ((log_t - self.log_min) * self.idbin).floor();
        let bin = if raw.is_nan() || raw <= 0.0 {
            0
        } else if raw >= self.nbins as f64 {
            self.nbins - 1
        } else {
            raw as usize
        };
        let frac = (log_t - self.log_node(bin)) * self.idbin;
        BinLocation { bin, frac }
    }
}

/// Linear interpolation between two adjacent table entries, exact at both ends.
#[inline]
pub fn lerp(lo: f64, hi: f64, frac: f64) -> f64 {
    (1.0 - frac) * lo + frac * hi
}

/// Supplies flat tables of `nbins + 1` values keyed by string identifiers.
pub trait TableSource {
    fn read_table(&self, key: &str) -> Result<Vec<f64>, ChemistryError>;

    /// short description used in log messages
    fn describe(&self) -> String {
        "table source".to_string()
    }
}

impl TableSource for HashMap<String, Vec<f64>> {
    fn read_table(&self, key: &str) -> Result<Vec<f64>, ChemistryError> {
        self.get(key)
            .cloned()
            .ok_or_else(|| ChemistryError::MissingTable(key.to_string()))
    }

    fn describe(&self) -> String {
        format!("in-memory map with {} tables", self.len())
    }
}

/// Immutable store of every coefficient table used by the network.
#[derive(Debug, Clone)]
pub struct RateTableStore {
    grid: TemperatureGrid,
    reactions: Vec<Vec<f64>>,
    cooling: Vec<Vec<f64>>,
    gamma: Vec<Vec<f64>>,
}

impl RateTableStore {
    /// Reads every table from `source`. A missing or short table is a fatal
    /// setup error; contents are not validated beyond their length.
    pub fn load(grid: TemperatureGrid, source: &dyn TableSource) -> Result<Self, ChemistryError> {
        let read = |key: &str| -> Result<Vec<f64>, ChemistryError> {
            let table = source.read_table(key)?;
            if table.len() != grid.table_len() {
                return Err(ChemistryError::TableLength {
                    key: key.to_string(),
                    expected: grid.table_len(),
                    found: table.len(),
                });
            }
            Ok(table)
        };
        let reactions = Reaction::ALL
            .iter()
            .map(|r| read(r.key()))
            .collect::<Result<Vec<_>, _>>()?;
        let cooling = Cooling::ALL
            .iter()
            .map(|c| read(c.key()))
            .collect::<Result<Vec<_>, _>>()?;
        let gamma = GammaTable::ALL
            .iter()
            .map(|g| read(g.key()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "loaded {} rate, {} cooling and {} gamma tables from {} ({} bins over [{}, {}] K)",
            reactions.len(),
            cooling.len(),
            gamma.len(),
            source.describe(),
            grid.nbins,
            grid.t_min,
            grid.t_max
        );
        Ok(Self {
            grid,
            reactions,
            cooling,
            gamma,
        })
    }

    pub fn grid(&self) -> &TemperatureGrid {
        &self.grid
    }

    pub fn reaction(&self, r: Reaction) -> &[f64] {
        &self.reactions[r.index()]
    }

    pub fn cooling(&self, c: Cooling) -> &[f64] {
        &self.cooling[c.index()]
    }

    pub fn gamma(&self, g: GammaTable) -> &[f64] {
        &self.gamma[g.index()]
    }

    /// All tables keyed by their identifiers, e.g. for writing them back out.
    pub fn to_map(&self) -> HashMap<String, Vec<f64>> {
        let mut map = HashMap::new();
        for r in Reaction::ALL {
            map.insert(r.key().to_string(), self.reaction(*r).to_vec());
        }
        for c in Cooling::ALL {
            map.insert(c.key().to_string(), self.cooling(*c).to_vec());
        }
        for g in GammaTable::ALL {
            map.insert(g.key().to_string(), self.gamma(*g).to_vec());
        }
        map
    }
}
