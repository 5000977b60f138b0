//! Fixed sample households inserted by the walkthrough.

use super::family::{Address, Child, Family, Parent, Pet};

fn parent(first_name: &str, family_name: Option<&str>) -> Parent {
    Parent {
        first_name: first_name.to_string(),
        family_name: family_name.map(str::to_string),
    }
}

fn pet(given_name: &str) -> Pet {
    Pet {
        given_name: given_name.to_string(),
    }
}

/// The Andersen household of Seattle.
pub fn andersen_family() -> Family {
    Family {
        id: "Andersen.1".to_string(),
        last_name: "Andersen".to_string(),
        district: "WA5".to_string(),
        registered: true,
        address: Address {
            city: "Seattle".to_string(),
            county: "King".to_string(),
            state: "WA".to_string(),
        },
        parents: vec![parent("Thomas", None), parent("Mary Kay", None)],
        children: vec![Child {
            first_name: "Henriette Thaulow".to_string(),
            family_name: None,
            gender: Some("female".to_string()),
            grade: 5,
            pets: vec![pet("Fluffy")],
        }],
    }
}

/// The Wakefield household of Manhattan.
pub fn wakefield_family() -> Family {
    Family {
        id: "Wakefield.7".to_string(),
        last_name: "Wakefield".to_string(),
        district: "NY23".to_string(),
        registered: true,
        address: Address {
            city: "NY".to_string(),
            county: "Manhattan".to_string(),
            state: "NY".to_string(),
        },
        parents: vec![parent("Robin", Some("Wakefield")), parent("Ben", Some("Miller"))],
        children: vec![
            Child {
                first_name: "Jesse".to_string(),
                family_name: Some("Merriam".to_string()),
                gender: None,
                grade: 8,
                pets: vec![pet("Goofy"), pet("Shadow")],
            },
            Child {
                first_name: "Lisa".to_string(),
                family_name: Some("Miller".to_string()),
                gender: Some("female".to_string()),
                grade: 1,
                pets: Vec::new(),
            },
        ],
    }
}

/// Both households, in insertion order.
pub fn sample_families() -> [Family; 2] {
    [andersen_family(), wakefield_family()]
}
