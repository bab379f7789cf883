//! Record types and the shared store.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const FIRST_NAMES: [&str; 10] = [
    "John", "Paul", "George", "Steve", "David", "Chris", "Dawn", "Sarah", "Amy", "Dena",
];
const LAST_NAMES: [&str; 10] = [
    "Jones", "Smith", "Johnson", "Mills", "Elliot", "Meyers", "Nelson", "Hayes", "Pollard",
    "Farmer",
];
const CITIES: [&str; 10] = [
    "Monroe",
    "Rockrord",
    "Springfield",
    "Franklin",
    "Washington",
    "Salem",
    "Fairview",
    "Bristol",
    "Madison",
    "Georgetown",
];
const STATES: [&str; 10] = ["IL", "WI", "AL", "MT", "CA", "WA", "OR", "VT", "FL", "TX"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Person {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
}

impl Person {
    fn random(id: usize) -> Self {
        Self {
            id: id.to_string(),
            firstname: FIRST_NAMES[fastrand::usize(..FIRST_NAMES.len())].to_string(),
            lastname: LAST_NAMES[fastrand::usize(..LAST_NAMES.len())].to_string(),
            address: Some(Address {
                city: CITIES[fastrand::usize(..CITIES.len())].to_string(),
                state: STATES[fastrand::usize(..STATES.len())].to_string(),
            }),
        }
    }
}

/// Ordered, lock-guarded list of people.
#[derive(Debug, Default)]
pub struct PeopleStore {
    people: RwLock<Vec<Person>>,
}

impl PeopleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `count` random people with ids `1..=count`.
    pub fn seeded(count: usize) -> Self {
        let people = (1..=count).map(Person::random).collect();
        Self {
            people: RwLock::new(people),
        }
    }

    pub async fn list(&self) -> Vec<Person> {
        self.people.read().await.clone()
    }

    /// First person with a matching id.
    pub async fn get(&self, id: &str) -> Option<Person> {
        self.people
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Append a record, returning the full list afterwards.
    pub async fn insert(&self, person: Person) -> Vec<Person> {
        let mut people = self.people.write().await;
        people.push(person);
        people.clone()
    }

    /// Remove the first record with a matching id, returning what remains.
    pub async fn remove(&self, id: &str) -> Vec<Person> {
        let mut people = self.people.write().await;
        if let Some(index) = people.iter().position(|p| p.id == id) {
            people.remove(index);
        }
        people.clone()
    }

    pub async fn len(&self) -> usize {
        self.people.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.people.read().await.is_empty()
    }
}
