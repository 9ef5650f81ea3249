/*
[INPUT]:  Caller-supplied request parameters (scalars and arrays)
[OUTPUT]: Canonical, form-encoded query strings
[POS]:    Data layer - query construction shared by signed and public calls
[UPDATE]: When changing parameter encoding (affects query_hash bytes)
*/

use url::form_urlencoded;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    List(Vec<String>),
}

impl QueryValue {
    /// Scalar value, if this is not a list
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(value) => Some(value),
            QueryValue::List(_) => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Scalar(value.clone())
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

impl_scalar_from!(bool, i32, i64, u32, u64, usize, f64);

impl<T: Into<String>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for QueryValue {
    fn from(values: [&str; N]) -> Self {
        QueryValue::List(values.iter().map(|value| value.to_string()).collect())
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        QueryValue::List(values.iter().map(|value| value.to_string()).collect())
    }
}

/// Request parameters keyed by unique name.
///
/// Insertion order is kept. The canonical string lists every scalar first,
/// then each array parameter as repeated `name[]=value` pairs. Brackets are
/// left literal; names and values are form-encoded individually.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Query::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, replacing (in place) any previous value under the same name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<QueryValue>,
    ) -> Option<QueryValue> {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.params.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, name: &str) -> Option<QueryValue> {
        let index = self.params.iter().position(|(existing, _)| existing == name)?;
        Some(self.params.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Canonical query string.
    ///
    /// These are the bytes hashed into `query_hash` and also the bytes sent
    /// on the wire; both paths must go through this method.
    pub fn to_query_string(&self) -> String {
        let mut scalars = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            if let QueryValue::Scalar(value) = value {
                scalars.append_pair(name, value);
            }
        }

        let mut segments = Vec::new();
        let scalar_part = scalars.finish();
        if !scalar_part.is_empty() {
            segments.push(scalar_part);
        }

        for (name, value) in &self.params {
            if let QueryValue::List(items) = value {
                let key = encode_component(name);
                segments.extend(
                    items
                        .iter()
                        .map(|item| format!("{key}[]={}", encode_component(item))),
                );
            }
        }

        segments.join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (name, value) in iter {
            query.insert(name, value);
        }
        query
    }
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
