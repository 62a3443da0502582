//! Starter diagrams.
//!
//! A small catalogue of example sources, one per common diagram type, that
//! a new document can start from.

use std::fmt;

/// Grouping used when listing templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Flow,
    Interaction,
    Structure,
    Planning,
    Data,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Flow,
        Self::Interaction,
        Self::Structure,
        Self::Planning,
        Self::Data,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Interaction => "interaction",
            Self::Structure => "structure",
            Self::Planning => "planning",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An example diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub source: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "flowchart",
        name: "Flowchart",
        description: "Decision flow with branches and a loop back",
        category: Category::Flow,
        source: "flowchart TD
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Ship it]
    B -->|No| D[Debug]
    D --> B
    C --> E[End]",
    },
    Template {
        id: "state",
        name: "State Diagram",
        description: "Lifecycle of a request with retries",
        category: Category::Flow,
        source: "stateDiagram-v2
    [*] --> Idle
    Idle --> Pending: submit
    Pending --> Done: success
    Pending --> Failed: error
    Failed --> Pending: retry
    Done --> [*]",
    },
    Template {
        id: "sequence",
        name: "Sequence Diagram",
        description: "Client, server and database exchanging messages",
        category: Category::Interaction,
        source: "sequenceDiagram
    participant C as Client
    participant S as Server
    participant D as Database
    C->>S: GET /items
    S->>D: SELECT * FROM items
    D-->>S: rows
    S-->>C: 200 OK",
    },
    Template {
        id: "class",
        name: "Class Diagram",
        description: "Inheritance and composition between types",
        category: Category::Structure,
        source: "classDiagram
    class Shape {
        +area() float
    }
    class Circle {
        +radius float
    }
    class Canvas {
        +shapes List~Shape~
    }
    Shape <|-- Circle
    Canvas *-- Shape",
    },
    Template {
        id: "mindmap",
        name: "Mind Map",
        description: "Topics branching from a central idea",
        category: Category::Structure,
        source: "mindmap
  root((Project))
    Goals
      Fast
      Reliable
    Risks
      Scope
      Staffing",
    },
    Template {
        id: "gantt",
        name: "Gantt Chart",
        description: "Two-phase schedule with a dependency",
        category: Category::Planning,
        source: "gantt
    title Release plan
    dateFormat YYYY-MM-DD
    section Build
    Design      :a1, 2024-01-01, 7d
    Implement   :a2, after a1, 14d
    section Ship
    Test        :after a2, 5d
    Release     :milestone, 1d",
    },
    Template {
        id: "pie",
        name: "Pie Chart",
        description: "Share of a whole across categories",
        category: Category::Data,
        source: "pie title Time spent
    \"Coding\" : 45
    \"Reviews\" : 25
    \"Meetings\" : 30",
    },
];

/// Every template, grouped by category.
pub fn all() -> &'static [Template] {
    TEMPLATES
}

/// Looks a template up by id.
pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.id == id)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static Template> {
    TEMPLATES
        .iter()
        .filter(move |template| template.category == category)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use inkframe_compiler::header;

    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = all().iter().map(|template| template.id).collect();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_every_template_has_a_known_header() {
        for template in all() {
            assert!(
                header::check_header(template.source).is_none(),
                "template `{}` has no known diagram header",
                template.id
            );
        }
    }

    #[test]
    fn test_find_and_categories() {
        assert_eq!(find("pie").map(|template| template.category), Some(Category::Data));
        assert!(find("missing").is_none());
        assert_eq!(by_category(Category::Flow).count(), 2);
        let listed: usize = Category::ALL.iter().map(|c| by_category(*c).count()).sum();
        assert_eq!(listed, all().len());
    }
}
