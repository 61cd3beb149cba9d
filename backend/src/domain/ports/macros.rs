//! `define_port_error!`: adapter error enums with snake_case constructors.
//!
//! Variants are either unit variants or carry `String` fields. Each variant
//! gets a constructor named after it in snake case, taking `impl Into<String>`
//! per field, so adapters can write `ShipmentPersistenceError::query(err)`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : String),+ $(,)? } )? => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: String),+ } )?,
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = "Build the `" $variant "` variant."]
                    pub fn [<$variant:snake>]($($($field: impl Into<String>),+)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),+ } )?
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
