//! Static subject/module configuration.
//!
//! The catalog fixes the enumeration order used when several subjects are
//! concatenated: modules ascending, subjects in declaration order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub number: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub display_name: String,
    pub module: u8,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate module number {0}")]
    DuplicateModule(u8),

    #[error("duplicate subject name {0}")]
    DuplicateSubject(String),

    #[error("subject {subject} references unknown module {module}")]
    UnknownModule { subject: String, module: u8 },

    #[error("subject name is empty")]
    EmptySubjectName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCatalog {
    modules: Vec<ModuleInfo>,
    subjects: Vec<Subject>,
}

impl SubjectCatalog {
    /// Build a catalog, checking that names are unique and every subject
    /// belongs to a declared module. Modules are kept sorted by number.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicates, blank subject names, or dangling
    /// module references.
    pub fn new(mut modules: Vec<ModuleInfo>, subjects: Vec<Subject>) -> Result<Self, CatalogError> {
        modules.sort_by_key(|m| m.number);
        if let Some(pair) = modules.windows(2).find(|pair| pair[0].number == pair[1].number) {
            return Err(CatalogError::DuplicateModule(pair[0].number));
        }

        for (i, subject) in subjects.iter().enumerate() {
            if subject.name.trim().is_empty() {
                return Err(CatalogError::EmptySubjectName);
            }
            if subjects[..i].iter().any(|s| s.name == subject.name) {
                return Err(CatalogError::DuplicateSubject(subject.name.clone()));
            }
            if !modules.iter().any(|m| m.number == subject.module) {
                return Err(CatalogError::UnknownModule {
                    subject: subject.name.clone(),
                    module: subject.module,
                });
            }
        }

        Ok(Self { modules, subjects })
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, number: u8) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.number == number)
    }

    #[must_use]
    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Subjects of one module in declaration order.
    pub fn subjects_in_module(&self, number: u8) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(move |s| s.module == number)
    }

    /// Every subject, modules ascending, declaration order within a module.
    pub fn subjects_in_order(&self) -> impl Iterator<Item = &Subject> {
        self.modules
            .iter()
            .flat_map(|m| self.subjects_in_module(m.number))
    }
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        let modules = [
            (1, "Programming and Algorithms"),
            (2, "Databases"),
            (3, "Systems and Networks"),
            (4, "Modern Technologies"),
        ]
        .into_iter()
        .map(|(number, name)| ModuleInfo {
            number,
            name: name.to_string(),
        })
        .collect();

        let subjects = [
            (1, "fundamentele_programarii", "Programming Fundamentals"),
            (1, "programare_in_python", "Programming in Python"),
            (1, "programare_orientata_obiect", "Object-Oriented Programming (C++)"),
            (1, "metode_avansate_programare_java", "Advanced Programming Methods (Java)"),
            (1, "tehnici_avansate_programare", "Advanced Programming Techniques"),
            (1, "algoritmi_si_structuri_de_date", "Algorithms and Data Structures"),
            (2, "modul_2_baze_de_date", "Databases"),
            (2, "modul_2_sisteme_de_gestiune_a_bazelor_de_date", "Database Management Systems"),
            (3, "modul_3_sisteme_de_operare", "Operating Systems"),
            (3, "modul_3_retele_de_calculatoare", "Computer Networks"),
            (3, "modul_3_administrare_retele_de_calculatoare", "Computer Network Administration"),
            (3, "modul_3_criptografie", "Cryptography"),
            (4, "modul_4_tehnologii_web", "Web Technologies"),
            (4, "modul_4_comert_electronic", "E-Commerce"),
            (4, "modul_4_cloud_computing", "Cloud Computing"),
            (4, "modul_4_inovare_si_transformare_digitala", "Innovation and Digital Transformation"),
        ]
        .into_iter()
        .map(|(module, name, display_name)| Subject {
            name: name.to_string(),
            display_name: display_name.to_string(),
            module,
        })
        .collect();

        Self { modules, subjects }
    }
}
