use super::catalog::{CatalogError, ProductCatalog};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

/// Points awarded to each product for one (question, answer) pair.
pub type ProductWeights = BTreeMap<String, u32>;

/// question -> answer -> product -> points. Immutable once built.
///
/// Pairs missing from the table, and pairs mapped to an empty weight set,
/// contribute nothing to any product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringRuleTable {
    rules: BTreeMap<String, BTreeMap<String, ProductWeights>>,
}

impl ScoringRuleTable {
    pub fn new(rules: BTreeMap<String, BTreeMap<String, ProductWeights>>) -> Self {
        Self { rules }
    }

    #[rustfmt::skip]
    pub fn standard() -> Self {
        let mut table = Self::default();

        table.declare("facilityType", "hospital", &[("hims", 10), ("elab", 5), ("epharma", 5), ("accrehealth", 5), ("mobileapp", 3)]);
        table.declare("facilityType", "clinic", &[("eclinic", 10), ("mobileapp", 5), ("telemedicine", 3)]);
        table.declare("facilityType", "lab", &[("elab", 10)]);
        table.declare("facilityType", "pharmacy", &[("epharma", 10)]);
        table.declare("facilityType", "veterinary", &[("eveterinary", 10)]);

        table.declare("orgSize", "small", &[("eclinic", 5), ("mobileapp", 2)]);
        table.declare("orgSize", "medium", &[("hims", 3), ("eclinic", 3), ("elab", 3), ("epharma", 3)]);
        table.declare("orgSize", "large", &[("hims", 5), ("elab", 4), ("epharma", 4), ("accrehealth", 3), ("mobileapp", 3)]);
        table.declare("orgSize", "enterprise", &[("hims", 8), ("elab", 5), ("epharma", 5), ("accrehealth", 5), ("mobileapp", 5), ("telemedicine", 3)]);

        table.declare("primaryNeed", "patient-management", &[("hims", 8), ("eclinic", 8), ("mobileapp", 5)]);
        table.declare("primaryNeed", "lab-automation", &[("elab", 10)]);
        table.declare("primaryNeed", "pharmacy", &[("epharma", 10)]);
        table.declare("primaryNeed", "telemedicine", &[("telemedicine", 10), ("mobileapp", 5)]);
        table.declare("primaryNeed", "quality", &[("accrehealth", 10)]);

        table.declare("currentSystem", "paper", &[("hims", 5), ("eclinic", 5), ("elab", 5), ("epharma", 5)]);
        table.declare("currentSystem", "legacy", &[("hims", 5), ("eclinic", 5), ("elab", 5), ("epharma", 5)]);
        table.declare("currentSystem", "upgrade", &[("telemedicine", 5), ("mobileapp", 5), ("accrehealth", 3)]);
        table.declare("currentSystem", "new", &[("hims", 8), ("eclinic", 5), ("elab", 5), ("epharma", 5), ("mobileapp", 3)]);

        // Region is collected for follow-up only and carries no weight.
        for region in ["uae", "saudi", "qatar", "kuwait", "bahrain", "other"] {
            table.declare("region", region, &[]);
        }

        table
    }

    fn declare(&mut self, question: &str, answer: &str, weights: &[(&str, u32)]) {
        let entry = self.weights_mut(question, answer);
        for (product, points) in weights {
            entry.insert((*product).to_string(), *points);
        }
    }

    fn weights_mut(&mut self, question: &str, answer: &str) -> &mut ProductWeights {
        self.rules
            .entry(question.to_string())
            .or_default()
            .entry(answer.to_string())
            .or_default()
    }

    /// Adds `points` to whatever the product already has for this answer.
    fn accumulate(
        &mut self,
        question: &str,
        answer: &str,
        product: &str,
        points: u32,
    ) -> Result<(), CatalogError> {
        let current = self
            .weights_mut(question, answer)
            .entry(product.to_string())
            .or_default();
        *current = current
            .checked_add(points)
            .ok_or_else(|| CatalogError::WeightOverflow {
                question: question.to_string(),
                answer: answer.to_string(),
                product: product.to_string(),
            })?;
        Ok(())
    }

    /// Parses a nested JSON object in the same shape as the table.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses flat `question,answer,product,points` rows. A row with an empty
    /// product declares an answer that carries no weight. Repeated
    /// (question, answer, product) rows accumulate.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::default();

        for record in csv_reader.deserialize::<RuleRow>() {
            let row = record?;
            match row.product {
                Some(product) => table.accumulate(
                    &row.question,
                    &row.answer,
                    &product,
                    row.points.unwrap_or(0),
                )?,
                None => {
                    table.weights_mut(&row.question, &row.answer);
                }
            }
        }

        Ok(table)
    }

    /// Picks the parser from the file extension; anything but `.csv` is JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::io::BufReader::new(std::fs::File::open(path)?);
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    pub fn lookup(&self, question: &str, answer: &str) -> Option<&ProductWeights> {
        self.rules.get(question).and_then(|answers| answers.get(answer))
    }

    /// Product keys referenced by some rule but absent from `catalog`.
    pub fn dangling_products(&self, catalog: &ProductCatalog) -> BTreeSet<String> {
        self.rules
            .values()
            .flat_map(|answers| answers.values())
            .flat_map(|weights| weights.keys())
            .filter(|product| !catalog.contains(product))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    question: String,
    answer: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    product: Option<String>,
    #[serde(default)]
    points: Option<u32>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_table_carries_reference_weights() {
        let table = ScoringRuleTable::standard();
        let hospital = table.lookup("facilityType", "hospital").expect("hospital rule");
        assert_eq!(hospital.get("hims"), Some(&10));
        assert_eq!(hospital.get("mobileapp"), Some(&3));
        assert_eq!(hospital.get("eclinic"), None);

        let region = table.lookup("region", "uae").expect("region declared");
        assert!(region.is_empty());
        assert!(table.lookup("region", "mars").is_none());
    }

    #[test]
    fn standard_table_references_only_catalog_products() {
        let table = ScoringRuleTable::standard();
        assert!(table
            .dangling_products(&ProductCatalog::standard())
            .is_empty());
    }

    #[test]
    fn csv_rows_build_nested_table() {
        let csv = "question,answer,product,points\n\
                   facilityType,lab,elab,10\n\
                   facilityType,lab,elab,2\n\
                   orgSize,small,eclinic,5\n\
                   region,uae,,\n";
        let table = ScoringRuleTable::from_csv_reader(Cursor::new(csv)).expect("csv parses");

        assert_eq!(
            table.lookup("facilityType", "lab").and_then(|w| w.get("elab")),
            Some(&12)
        );
        assert_eq!(
            table.lookup("orgSize", "small").and_then(|w| w.get("eclinic")),
            Some(&5)
        );
        assert!(table.lookup("region", "uae").expect("declared").is_empty());
    }

    #[test]
    fn csv_rejects_negative_points() {
        let csv = "question,answer,product,points\nfacilityType,lab,elab,-3\n";
        let err = ScoringRuleTable::from_csv_reader(Cursor::new(csv)).expect_err("negative");
        assert!(matches!(err, CatalogError::Csv(_)));
    }

    #[test]
    fn csv_rejects_weights_that_overflow_when_accumulated() {
        let csv = "question,answer,product,points\n\
                   facilityType,lab,elab,4294967295\n\
                   facilityType,lab,elab,1\n";
        let err = ScoringRuleTable::from_csv_reader(Cursor::new(csv)).expect_err("overflow");
        assert!(matches!(
            &err,
            CatalogError::WeightOverflow { question, answer, product }
                if question == "facilityType" && answer == "lab" && product == "elab"
        ));
        assert!(err.to_string().contains("overflow the points range"));
    }

    #[test]
    fn json_table_flags_dangling_products() {
        let json = r#"{"facilityType":{"lab":{"elab":10,"lims-pro":4}}}"#;
        let table = ScoringRuleTable::from_json_reader(Cursor::new(json)).expect("json parses");
        let dangling = table.dangling_products(&ProductCatalog::standard());
        assert_eq!(dangling.into_iter().collect::<Vec<_>>(), ["lims-pro"]);
    }
}
