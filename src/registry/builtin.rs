//! Built-in feature support for the technologies the planner knows about

use super::DatabaseFeatureSupport;
use crate::model::{ObjectType::*, Paradigm};

pub fn technologies() -> Vec<DatabaseFeatureSupport> {
    vec![postgres(), mysql(), mongodb(), neo4j(), kafka(), pinecone()]
}

fn postgres() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("postgres", &[Paradigm::Relational])
        .full(&[
            Table,
            View,
            MaterializedView,
            Index,
            Constraint,
            Sequence,
            Function,
            Procedure,
            Trigger,
            CustomType,
            Schema,
        ])
        .partial(Vector, "requires the pgvector extension")
        .emulated(Embedding, &[Vector], "stored as pgvector columns")
        .instead(Collection, &[Table])
        .instead(Document, &[Table])
        .instead(Node, &[Table])
        .instead(Relationship, &[Table])
        .instead(VectorIndex, &[Index])
        .instead(Topic, &[Table])
        .prefer(&["mysql", "mongodb"])
        .build()
}

fn mysql() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("mysql", &[Paradigm::Relational])
        .full(&[Table, View, Index, Constraint, Function, Procedure, Trigger, Schema])
        .emulated(MaterializedView, &[Table], "refreshed summary tables")
        .emulated(Sequence, &[Table], "AUTO_INCREMENT columns")
        .instead(Collection, &[Table])
        .instead(Document, &[Table])
        .instead(Node, &[Table])
        .instead(Relationship, &[Table])
        .instead(Topic, &[Table])
        .prefer(&["postgres"])
        .build()
}

fn mongodb() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("mongodb", &[Paradigm::Document])
        .full(&[Collection, Document, Index, View])
        .partial(Constraint, "JSON schema validation only")
        .partial(Vector, "Atlas Vector Search only")
        .emulated(MaterializedView, &[Collection], "on-demand $merge pipelines")
        .instead(Table, &[Collection])
        .instead(Node, &[Collection])
        .instead(Relationship, &[Collection])
        .instead(Topic, &[Collection])
        .instead(Embedding, &[Vector])
        .instead(VectorIndex, &[Index])
        .prefer(&["postgres"])
        .build()
}

fn neo4j() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("neo4j", &[Paradigm::Graph])
        .full(&[Node, Relationship, Index, Constraint])
        .partial(Vector, "vector properties on nodes only")
        .partial(VectorIndex, "node label vector indexes only")
        .instead(Table, &[Node])
        .instead(Collection, &[Node])
        .instead(Document, &[Node])
        .prefer(&["postgres", "mongodb"])
        .build()
}

fn kafka() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("kafka", &[Paradigm::Streaming])
        .full(&[Topic, Stream])
        .instead(Table, &[Topic])
        .instead(Collection, &[Topic])
        .instead(Document, &[Topic])
        .prefer(&["postgres", "mongodb"])
        .build()
}

fn pinecone() -> DatabaseFeatureSupport {
    DatabaseFeatureSupport::builder("pinecone", &[Paradigm::Vector])
        .full(&[Vector, VectorIndex, Embedding])
        .instead(Collection, &[VectorIndex])
        .instead(Document, &[Vector])
        .prefer(&["postgres"])
        .build()
}
