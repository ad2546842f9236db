#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|field_and_value: (jform::Field, jform::FieldValue)| {
    let (field, value) = field_and_value;

    let first = jform::validate_value(&field, &value).map(|err| err.to_string());
    let second = jform::validate_value(&field, &value).map(|err| err.to_string());
    assert_eq!(first, second);

    let _ = jform::check_live(&field, &value);
});
