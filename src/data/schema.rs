//! Column names and fixed vocabularies of the beverage menu dataset.

pub const CATEGORY: &str = "Beverage_category";
pub const BEVERAGE: &str = "Beverage";
pub const PREP: &str = "Beverage_prep";

pub const CALORIES: &str = "Calories";
pub const TOTAL_FAT: &str = "Total Fat (g)";
pub const TRANS_FAT: &str = "Trans Fat (g)";
pub const SATURATED_FAT: &str = "Saturated Fat (g)";
pub const SODIUM: &str = "Sodium (mg)";
pub const CARBOHYDRATES: &str = "Total Carbohydrates (g)";
pub const CHOLESTEROL: &str = "Cholesterol (mg)";
pub const FIBRE: &str = "Dietary Fibre (g)";
pub const SUGARS: &str = "Sugars (g)";
pub const PROTEIN: &str = "Protein (g)";
pub const VITAMIN_A: &str = "Vitamin A (% DV)";
pub const VITAMIN_C: &str = "Vitamin C (% DV)";
pub const CALCIUM: &str = "Calcium (% DV)";
pub const IRON: &str = "Iron (% DV)";
pub const CAFFEINE: &str = "Caffeine (mg)";

/// Derived from [`PREP`].
pub const SIZE: &str = "Size";
/// Derived from [`PREP`].
pub const MILK_TYPE: &str = "Milk_Type";

/// Text columns every input file must carry.
pub const REQUIRED_TEXT_COLUMNS: [&str; 3] = [CATEGORY, BEVERAGE, PREP];

/// Columns holding `%`-suffixed values.
pub const PERCENT_COLUMNS: [&str; 4] = [VITAMIN_A, VITAMIN_C, CALCIUM, IRON];

/// Plain numeric columns. Unparsable cells become missing.
pub const PLAIN_NUMERIC_COLUMNS: [&str; 11] = [
    CALORIES,
    TOTAL_FAT,
    TRANS_FAT,
    SATURATED_FAT,
    SODIUM,
    CARBOHYDRATES,
    CHOLESTEROL,
    FIBRE,
    SUGARS,
    PROTEIN,
    CAFFEINE,
];

/// Size tokens in match priority order (also the display order).
pub const SIZE_ORDER: [&str; 4] = ["Short", "Tall", "Grande", "Venti"];
pub const SIZE_FALLBACK: &str = "Other";

/// Milk tokens in match priority order.
pub const MILK_TYPES: [&str; 4] = ["Nonfat Milk", "2% Milk", "Soymilk", "Whole Milk"];
pub const MILK_FALLBACK: &str = "No Milk";
