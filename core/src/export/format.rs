use csv::{Terminator, WriterBuilder};
use std::io::{self, Write};

/// Characters that cannot appear in a file name on common platforms
const UNSAFE_FILE_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Record terminator of every CSV file
const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Formats a number for a CSV cell
///
/// Uses the shortest representation that round-trips, always with a
/// fractional part (`50.0`, `95.2`). Exponents carry a sign and at least
/// two digits (`1e-05`, `1e+16`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// Replaces characters that are unsafe in file names with `_`
///
/// # Example
///
/// ```
/// use dvhcat_core::export::sanitize_file_stem;
///
/// assert_eq!(sanitize_file_stem("PTV/1:A"), "PTV_1_A");
/// ```
pub fn sanitize_file_stem(name: &str) -> String {
    name.replace(UNSAFE_FILE_CHARS, "_")
}

/// File name of a patient pivot, `<PatientID>.csv`
pub fn patient_file_name(patient_id: &str) -> String {
    format!("{}.csv", sanitize_file_stem(patient_id))
}

/// File name of a structure pivot, `structure_<Name>.csv`
pub fn structure_file_name(structure: &str) -> String {
    format!("structure_{}.csv", sanitize_file_stem(structure))
}

/// Creates a CSV writer for one table section
pub(crate) fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(out)
}

/// Writes the empty line separating two table sections
pub(crate) fn write_blank_line<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(LINE_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50.0, "50.0")]
    #[case(95.2, "95.2")]
    #[case(0.0, "0.0")]
    #[case(-0.0, "-0.0")]
    #[case(0.1 + 0.2, "0.30000000000000004")]
    #[case(123456789.0, "123456789.0")]
    #[case(1e-5, "1e-05")]
    #[case(1.5e-7, "1.5e-07")]
    #[case(1e16, "1e+16")]
    #[case(2.5e120, "2.5e+120")]
    #[case(f64::INFINITY, "inf")]
    #[case(f64::NAN, "nan")]
    fn test_format_number(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_number(value), expected);
    }

    #[rstest]
    #[case("PTV/1:A", "PTV_1_A")]
    #[case(r#"a\b*c?d"e<f>g|h"#, "a_b_c_d_e_f_g_h")]
    #[case("Bladder", "Bladder")]
    #[case("CTV 1 (high)", "CTV 1 (high)")]
    fn test_sanitize_file_stem(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_stem(name), expected);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(patient_file_name("P001"), "P001.csv");
        assert_eq!(patient_file_name("../P1"), ".._P1.csv");
        assert_eq!(structure_file_name("PTV/1:A"), "structure_PTV_1_A.csv");
    }

    #[test]
    fn test_csv_writer_quotes_when_needed() {
        let mut buf = Vec::new();
        {
            let mut writer = csv_writer(&mut buf);
            writer.write_record(["Patient Name", "Doe, Jane"]).unwrap();
            writer.write_record(["a", ""]).unwrap();
            writer.flush().unwrap();
        }
        write_blank_line(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Patient Name,\"Doe, Jane\"\r\na,\r\n\r\n"
        );
    }
}
