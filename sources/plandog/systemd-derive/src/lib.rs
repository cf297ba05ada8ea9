/*!

Macros to serialize structs to `systemd` unit file format

## Description

The `SystemdUnit` and `SystemdUnitSection` macros serialize structs representing `systemd` unit
files, such as the `.network` and `.link` files read by `systemd-networkd` and `systemd-udevd`.

Under the hood, the macros implement `Display` for structs.  This allows converting the structs to
a string suitable for writing directly to a file.

The macros expect a "top-level" struct that represents the unit file, with nested structs
representing the sections of said file.  Sections are written in field order and separated by a
single blank line.  Each section always writes its `[Header]` line, even when it has no entries;
`systemd` accepts an empty `[Match]` section as "match everything".

Fields of a struct deriving `SystemdUnit` must be `Option`s or `Vec`s of a type deriving
`SystemdUnitSection`.  A `Vec` field serializes as a repeated section.

Fields of a struct deriving `SystemdUnitSection` must be `Option`s or `Vec`s of a type whose
`Display` output is a complete `Key=Value` entry.  Entries are written in field order, and within
a `Vec` in iteration order, one per line.  The macros never reorder anything, so the caller's
ordering is the file's ordering.

## Parameters

The `SystemdUnit` macro takes no parameters.

The `SystemdUnitSection` macro requires the `section` parameter on the struct: the name of the
section the struct represents, with or without the surrounding brackets.

# Example

```ignore
use std::fmt::Display;
use systemd_derive::{SystemdUnit, SystemdUnitSection};

struct Entry(&'static str, String);

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.0, self.1)
    }
}

#[derive(SystemdUnit)]
struct LinkConfig {
    r#match: Option<MatchSection>,
    link: Option<LinkSection>,
}

#[derive(SystemdUnitSection)]
#[systemd(section = "Match")]
struct MatchSection {
    entries: Vec<Entry>,
}

#[derive(SystemdUnitSection)]
#[systemd(section = "Link")]
struct LinkSection {
    entries: Vec<Entry>,
}

let cfg = LinkConfig {
    r#match: Some(MatchSection {
        entries: vec![Entry("Driver", "ixgbe".to_string())],
    }),
    link: Some(LinkSection {
        entries: vec![Entry("Name", "lom1".to_string())],
    }),
};

println!("{}", cfg);
```

Would result in the following being printed:
```ignore
[Match]
Driver=ixgbe

[Link]
Name=lom1
```
*/

use darling::{ast, FromDeriveInput, FromField, ToTokens};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Ident};

/// A macro to simplify serializing a unit file.  See the description in the lib documentation.
#[proc_macro_derive(SystemdUnit)]
pub fn derive_systemd_unit(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let n =
        SystemdUnit::from_derive_input(&ast).expect("Unable to parse `systemd` macro arguments");

    quote!(#n).into()
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct SystemdUnit {
    pub ident: Ident,
    pub data: ast::Data<(), SystemdSection>,
}

#[derive(Debug, FromField)]
struct SystemdSection {
    ident: Option<Ident>,
}

impl ToTokens for SystemdUnit {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let SystemdUnit { ident, data } = self;

        let sections: Vec<Ident> = data
            .as_ref()
            .take_struct()
            // The annotation supports(struct_named) ensures our input will always be a struct
            .expect("Will never be anything but a struct")
            .fields
            .iter()
            .filter_map(|f| f.ident.clone())
            .collect();

        tokens.extend(quote! {
            impl std::fmt::Display for #ident {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    // `Vec`s and `Option`s are both iterators, so every field chains the same way
                    let sections = std::iter::empty::<&dyn std::fmt::Display>()
                        #(.chain(self.#sections.iter().map(|s| s as &dyn std::fmt::Display)))*;

                    // Sections are separated by one blank line; nothing trails the last one
                    for (i, section) in sections.enumerate() {
                        if i > 0 {
                            writeln!(f)?;
                        }
                        write!(f, "{}", section)?;
                    }
                    Ok(())
                }
            }
        });
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// A macro to simplify serializing a section of a unit file.  See the description in the lib
/// documentation.
#[proc_macro_derive(SystemdUnitSection, attributes(systemd))]
pub fn derive_systemd_unit_section(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let n = SystemdUnitSection::from_derive_input(&ast)
        .expect("Unable to parse `systemd` macro arguments");

    quote!(#n).into()
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
#[darling(attributes(systemd))]
struct SystemdUnitSection {
    pub ident: Ident,
    pub data: ast::Data<(), SystemdUnitSectionField>,
    #[darling(rename = "section")]
    pub section_name: String,
}

#[derive(Debug, FromField)]
struct SystemdUnitSectionField {
    ident: Option<Ident>,
}

impl ToTokens for SystemdUnitSection {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let SystemdUnitSection {
            ident,
            data,
            section_name,
        } = self;

        let entries = data
            .as_ref()
            .take_struct()
            // supports(struct_named) ensures our input will always be a struct
            .expect("Will never be anything but a struct")
            .fields;

        // The header brackets are added here, so accept the name with or without them
        let section_name = section_name.replace(['[', ']'], "");

        tokens.extend(quote! {
            impl std::fmt::Display for #ident {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    writeln!(f, "[{}]", #section_name)?;

                    #(#entries)*
                    Ok(())
                }
            }

        });
    }
}

impl ToTokens for SystemdUnitSectionField {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let struct_field_name = self.ident.as_ref().expect("Should always have a name");
        // `Vec`s and `Option`s are both iterators, allowing us to write the same code for both
        tokens.extend(quote! {
            for entry in self.#struct_field_name.iter() {
                writeln!(f, "{}", entry)?;
            }
        })
    }
}
