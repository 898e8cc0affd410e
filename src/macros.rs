/// Construct a [`RawDocumentBuf`](crate::raw::RawDocumentBuf) from `key => value` pairs.
///
/// Values wrapped in `{ ... }` become sub-documents and values wrapped in `[ ... ]` become
/// sub-arrays; anything else is an expression convertible into a
/// [`RawBsonRef`](crate::raw::RawBsonRef). The macro evaluates to a
/// [`Result`](crate::error::Result), failing if a key or value cannot be encoded.
///
/// ```
/// use rawbson::rawdoc;
///
/// let name = String::from("rawbson");
/// let doc = rawdoc! {
///     "name" => &name,
///     "nested" => { "depth" => 1, "list" => [1, "two", { "three" => 3.0 }] },
///     "empty" => {},
/// }?;
///
/// assert_eq!(doc.get_str("name")?, "rawbson");
/// let list = doc.get_document("nested")?.get_array("list")?;
/// assert_eq!(list.get_document(2)?.get_f64("three")?, 3.0);
/// assert!(doc.get_document("empty")?.is_empty());
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[macro_export]
macro_rules! rawdoc {
    ( $($tt:tt)* ) => {
        (|| -> $crate::error::Result<$crate::raw::RawDocumentBuf> {
            let mut builder = $crate::builder::basic::DocumentBuilder::new();
            $crate::__rawdoc_body!(builder; $($tt)*);
            builder.extract()
        })()
    };
}

/// Construct a [`RawArrayBuf`](crate::raw::RawArrayBuf) from a list of values, with the same value
/// syntax as [`rawdoc!`].
///
/// ```
/// use rawbson::rawarr;
///
/// let array = rawarr![1, 2.5, [true, false], { "k" => "v" }]?;
/// assert_eq!(array.get_i32(0)?, 1);
/// assert!(!array.get_array(2)?.get_bool(1)?);
/// assert_eq!(array.get_document(3)?.get_str("k")?, "v");
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[macro_export]
macro_rules! rawarr {
    ( $($tt:tt)* ) => {
        (|| -> $crate::error::Result<$crate::raw::RawArrayBuf> {
            let mut builder = $crate::builder::basic::ArrayBuilder::new();
            $crate::__rawarr_body!(builder; $($tt)*);
            builder.extract()
        })()
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rawdoc_body {
    ($b:ident;) => {};

    ($b:ident; $key:expr => { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        $b.append_document($key, |sub| {
            $crate::__rawdoc_body!(sub; $($inner)*);
            Ok(())
        })?;
        $crate::__rawdoc_body!($b; $($($rest)*)?);
    };

    ($b:ident; $key:expr => [ $($inner:tt)* ] $(, $($rest:tt)*)?) => {
        $b.append_array($key, |sub| {
            $crate::__rawarr_body!(sub; $($inner)*);
            Ok(())
        })?;
        $crate::__rawdoc_body!($b; $($($rest)*)?);
    };

    ($b:ident; $key:expr => $value:expr $(, $($rest:tt)*)?) => {
        $b.append($key, $value)?;
        $crate::__rawdoc_body!($b; $($($rest)*)?);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rawarr_body {
    ($b:ident;) => {};

    ($b:ident; { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        $b.append_document(|sub| {
            $crate::__rawdoc_body!(sub; $($inner)*);
            Ok(())
        })?;
        $crate::__rawarr_body!($b; $($($rest)*)?);
    };

    ($b:ident; [ $($inner:tt)* ] $(, $($rest:tt)*)?) => {
        $b.append_array(|sub| {
            $crate::__rawarr_body!(sub; $($inner)*);
            Ok(())
        })?;
        $crate::__rawarr_body!($b; $($($rest)*)?);
    };

    ($b:ident; $value:expr $(, $($rest:tt)*)?) => {
        $b.append($value)?;
        $crate::__rawarr_body!($b; $($($rest)*)?);
    };
}
