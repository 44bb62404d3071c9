//! The ordered list of binaries the native build is expected to produce.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Binaries produced by polyhedral_common's CMake build that ship in the
/// `py_polyhedral` package.
///
/// Renaming or adding a native target means updating this list.
pub const POLYHEDRAL_BINARIES: &[&str] = &[
    "POLY_DirectSerialDualDesc",
    "CP_TestCopositivity",
    "CP_TestCompletePositivity",
    "LORENTZ_ReflectiveEdgewalk",
    "POLY_DirectFaceLattice",
    "INDEF_FORM_AutomorphismGroup",
    "INDEF_FORM_TestEquivalence",
    "INDEF_FORM_GetOrbitRepresentative",
    "INDEF_FORM_GetOrbit_IsotropicKplane",
    "LATT_canonicalize",
    "LATT_FindIsotropic",
    "LATT_SerialComputeDelaunay",
    "LATT_SerialLattice_IsoDelaunayDomain",
];

/// Ordered, validated artifact names.
///
/// Names are flat file names: they are looked up directly inside the build
/// directory and copied directly into the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ArtifactManifest {
    names: Vec<String>,
}

impl ArtifactManifest {
    pub fn new<I, S>(names: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ManifestError::Empty);
        }

        let mut seen = HashSet::new();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ManifestError::EmptyName(i));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ManifestError::NotFlat(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ManifestError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self {
            names: POLYHEDRAL_BINARIES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for ArtifactManifest {
    type Error = ManifestError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ArtifactManifest> for Vec<String> {
    fn from(manifest: ArtifactManifest) -> Self {
        manifest.names
    }
}
