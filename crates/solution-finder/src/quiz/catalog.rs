use super::domain::Product;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Failures while loading the static quiz configuration.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read quiz data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON quiz data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV rule data: {0}")]
    Csv(#[from] csv::Error),
    #[error("product key '{0}' is declared more than once")]
    DuplicateProduct(String),
    #[error("question key '{0}' is declared more than once")]
    DuplicateQuestion(String),
    #[error("question '{0}' has no answer options")]
    QuestionWithoutOptions(String),
    #[error("a quiz needs at least one question")]
    EmptyQuestionnaire,
    #[error("weights for '{product}' on {question}={answer} overflow the points range")]
    WeightOverflow {
        question: String,
        answer: String,
        product: String,
    },
    #[error("invalid quiz settings: {0}")]
    InvalidSettings(String),
}

/// Ordered product catalog. Declaration order is the tie-break priority when
/// two products end a scoring pass on the same score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.key.as_str()) {
                return Err(CatalogError::DuplicateProduct(product.key.clone()));
            }
        }
        Ok(Self { products })
    }

    pub fn standard() -> Self {
        Self {
            products: standard_products(),
        }
    }

    /// Reads a JSON array of products, or an object with a `products` array.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        let products = match document {
            CatalogDocument::List(products) => products,
            CatalogDocument::Wrapped { products } => products,
        };
        Self::new(products)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn get(&self, key: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.products.iter().position(|product| product.key == key)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

fn standard_products() -> Vec<Product> {
    vec![
        Product::new(
            "hims",
            "HIMS",
            "Hospital Information Management System",
            "Complete hospital management including patient registration, scheduling, billing, and clinical workflows.",
            "products/hims.html",
        ),
        Product::new(
            "eclinic",
            "E-Clinic",
            "Electronic Clinic Management",
            "Streamlined solution for outpatient clinics with appointment scheduling, EMR, and billing.",
            "products/e-clinic.html",
        ),
        Product::new(
            "elab",
            "E-Lab",
            "Laboratory Information System",
            "Complete lab automation with sample tracking, machine integration, and result management.",
            "products/e-lab.html",
        ),
        Product::new(
            "epharma",
            "E-Pharma",
            "Pharmacy Management System",
            "Inventory management, prescription processing, and insurance integration for pharmacies.",
            "products/e-pharma.html",
        ),
        Product::new(
            "telemedicine",
            "Telemedicine",
            "Virtual Care Platform",
            "Video consultations, e-prescriptions, and online booking for remote patient care.",
            "products/telemedicine.html",
        ),
        Product::new(
            "accrehealth",
            "AccreHealth",
            "Quality & Accreditation Management",
            "JCI, CBAHI, and quality management for continuous accreditation readiness.",
            "products/accre-health.html",
        ),
        Product::new(
            "eveterinary",
            "E-Veterinary",
            "Veterinary Clinic Management",
            "Complete veterinary practice management for animal healthcare facilities.",
            "products/e-veterinary.html",
        ),
        Product::new(
            "mobileapp",
            "Mobile App",
            "Patient Mobile Application",
            "Patient-facing app for appointments, health records, and telemedicine.",
            "products/mobile-app.html",
        ),
    ]
}
