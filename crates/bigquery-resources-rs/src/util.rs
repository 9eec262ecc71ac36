// used for `#[serde(skip_serializing_if = "is_false")]` attrs
#[inline]
pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

/// BigQuery encodes 64 bit integers as JSON strings. These helpers accept either
/// a string or a bare number, and always serialize as a string.
pub mod int64 {
    use std::fmt;
    use std::str::FromStr;

    use serde::de;

    pub trait Int64: Copy + fmt::Display + FromStr + TryFrom<i64> + TryFrom<u64> {}

    impl Int64 for i64 {}
    impl Int64 for u64 {}
    impl Int64 for i32 {}
    impl Int64 for u32 {}

    pub fn serialize<I, S>(value: &I, serializer: S) -> Result<S::Ok, S::Error>
    where
        I: Int64,
        S: serde::Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, I, D>(deserializer: D) -> Result<I, D::Error>
    where
        I: Int64,
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(Int64Visitor(std::marker::PhantomData))
    }

    struct Int64Visitor<I>(std::marker::PhantomData<I>);

    impl<'de, I: Int64> de::Visitor<'de> for Int64Visitor<I> {
        type Value = I;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer, or a string containing an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<I, E> {
            <I as TryFrom<i64>>::try_from(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<I, E> {
            <I as TryFrom<u64>>::try_from(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<I, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    pub mod optional {
        use super::Int64;

        pub fn serialize<I, S>(value: &Option<I>, serializer: S) -> Result<S::Ok, S::Error>
        where
            I: Int64,
            S: serde::Serializer,
        {
            match value {
                Some(value) => serializer.collect_str(value),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, I, D>(deserializer: D) -> Result<Option<I>, D::Error>
        where
            I: Int64,
            D: serde::Deserializer<'de>,
        {
            #[derive(serde::Deserialize)]
            #[serde(bound = "I: Int64")]
            struct Wrapper<I>(#[serde(with = "super")] I);

            let wrapper: Option<Wrapper<I>> = serde::Deserialize::deserialize(deserializer)?;
            Ok(wrapper.map(|Wrapper(inner)| inner))
        }
    }
}
