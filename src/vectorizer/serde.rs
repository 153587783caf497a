use std::marker::PhantomData;

use indexmap::IndexSet;
use num::Float;
use serde::{ser::SerializeStruct, Deserialize, Serialize};

use crate::{
    analyzer::Normalizer,
    error::ResponderError,
    utils::math::vector::SparseVec,
    vectorizer::VectorSpace,
};

/// Plain serializable form of a `VectorSpace`.
/// Use `into_vector_space` to turn it back into a queryable space; the
/// conversion checks the parallel-sequence invariants first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSpaceData<N = f32>
where
    N: Float,
{
    pub vocabulary: Vec<String>,
    pub idf: Vec<N>,
    pub rows: Vec<SparseVec<N>>,
    pub phrases: Vec<String>,
    pub answers: Vec<String>,
    pub normalizer: Normalizer,
}

impl<N> VectorSpaceData<N>
where
    N: Float,
{
    pub fn into_vector_space<E>(self) -> Result<VectorSpace<N, E>, ResponderError> {
        let invalid = |message: String| ResponderError::InvalidSnapshot { message };
        let dims = self.vocabulary.len();
        let vocabulary: IndexSet<Box<str>> = self.vocabulary.into_iter().map(Box::from).collect();
        if vocabulary.len() != dims {
            return Err(invalid("duplicated vocabulary term".to_string()));
        }
        if self.idf.len() != dims {
            return Err(invalid(format!("idf has {} weights for {} terms", self.idf.len(), dims)));
        }
        if self.rows.len() != self.phrases.len() || self.rows.len() != self.answers.len() {
            return Err(invalid(format!(
                "{} rows, {} phrases, {} answers",
                self.rows.len(),
                self.phrases.len(),
                self.answers.len()
            )));
        }
        if let Some(pos) = self.rows.iter().position(|row| row.len() != dims || !row.is_well_formed()) {
            return Err(invalid(format!("row {} does not fit {} dimensions", pos, dims)));
        }
        Ok(VectorSpace {
            vocabulary,
            idf: self.idf,
            rows: self.rows,
            phrases: self.phrases,
            answers: self.answers,
            normalizer: self.normalizer,
            _marker: PhantomData,
        })
    }
}

impl<N, E> VectorSpace<N, E>
where
    N: Float,
{
    pub fn to_data(&self) -> VectorSpaceData<N> {
        VectorSpaceData {
            vocabulary: self.vocabulary.iter().map(|t| t.to_string()).collect(),
            idf: self.idf.clone(),
            rows: self.rows.clone(),
            phrases: self.phrases.clone(),
            answers: self.answers.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<N, E> Serialize for VectorSpace<N, E>
where
    N: Float + Serialize,
{
    /// Serializes the same fields as `VectorSpaceData`.
    /// Deserialize through `VectorSpaceData`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("VectorSpaceData", 6)?;
        state.serialize_field("vocabulary", &self.vocabulary)?;
        state.serialize_field("idf", &self.idf)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("phrases", &self.phrases)?;
        state.serialize_field("answers", &self.answers)?;
        state.serialize_field("normalizer", &self.normalizer)?;
        state.end()
    }
}
