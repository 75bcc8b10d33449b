//! Built-in panel templates: (parameter name, unit, reference range).

type ParameterRow = (&'static str, &'static str, &'static str);

const COMPLETE_BLOOD_PICTURE: &[ParameterRow] = &[
    ("Hemoglobin (Male)", "g/dL", "13.0 – 17.0"),
    ("Hemoglobin (Female)", "g/dL", "12.0 – 15.0"),
    ("RBC Count (Male)", "million/µL", "4.5 – 5.9"),
    ("RBC Count (Female)", "million/µL", "4.1 – 5.1"),
    ("Hematocrit (PCV)", "%", "36 – 50"),
    ("MCV", "fL", "80 – 100"),
    ("MCH", "pg", "27 – 33"),
    ("MCHC", "g/dL", "32 – 36"),
    ("RDW-CV", "%", "11.5 – 14.5"),
    ("Total WBC Count", "/µL", "4,000 – 11,000"),
    ("Neutrophils", "%", "40 – 75"),
    ("Lymphocytes", "%", "20 – 40"),
    ("Monocytes", "%", "2 – 10"),
    ("Eosinophils", "%", "1 – 6"),
    ("Basophils", "%", "0 – 1"),
    ("Absolute Neutrophil Count", "/µL", "2,000 – 7,000"),
    ("Absolute Lymphocyte Count", "/µL", "1,000 – 3,000"),
    ("Absolute Monocyte Count", "/µL", "200 – 1,000"),
    ("Absolute Eosinophil Count", "/µL", "20 – 500"),
    ("Platelet Count", "/µL", "1.5 – 4.5 lakh"),
    ("MPV", "fL", "7.5 – 11.5"),
    ("PDW", "%", "9 – 17"),
    ("PCT", "%", "0.2 – 0.4"),
];

const BLOOD_SUGAR: &[ParameterRow] = &[
    ("Fasting Blood Sugar", "mg/dL", "70 – 99"),
    ("Post Prandial (PP)", "mg/dL", "< 140"),
    ("Random Blood Sugar", "mg/dL", "< 200"),
    ("HbA1c", "%", "< 5.7"),
];

const URINE_EXAMINATION: &[ParameterRow] = &[
    ("Color", "visual", "Pale Yellow"),
    ("pH", "pH", "4.5 – 8.0"),
    ("Protein", "qual", "Absent"),
    ("Sugar", "qual", "Absent"),
    ("RBCs", "/HPF", "0 – 2"),
    ("WBCs", "/HPF", "0 – 5"),
];

const LIVER_FUNCTION: &[ParameterRow] = &[
    ("Total Bilirubin", "mg/dL", "0.2 – 1.2"),
    ("Direct Bilirubin", "mg/dL", "0.0 – 0.3"),
    ("SGOT (AST)", "U/L", "5 – 40"),
    ("SGPT (ALT)", "U/L", "7 – 56"),
    ("Alkaline Phosphatase", "U/L", "44 – 147"),
];

const KIDNEY_FUNCTION: &[ParameterRow] = &[
    ("Urea", "mg/dL", "15 – 40"),
    ("Creatinine", "mg/dL", "0.6 – 1.3"),
    ("Uric Acid", "mg/dL", "2.4 – 7.0"),
];

const THYROID: &[ParameterRow] = &[
    ("TSH", "µIU/mL", "0.4 – 4.0"),
    ("T3", "ng/dL", "80 – 200"),
    ("T4", "µg/dL", "5 – 12"),
];

const HORMONE_VITAMIN: &[ParameterRow] = &[
    ("Vitamin D (25-OH)", "ng/mL", "20 – 50"),
    ("Vitamin B12", "pg/mL", "200 – 900"),
    ("Prolactin", "ng/mL", "4 – 25"),
];

const LIPID: &[ParameterRow] = &[
    ("Total Cholesterol", "mg/dL", "< 200"),
    ("LDL Cholesterol", "mg/dL", "< 100"),
    ("HDL Cholesterol", "mg/dL", "> 40"),
    ("Triglycerides", "mg/dL", "< 150"),
];

const SKIN_CYTOLOGY: &[ParameterRow] = &[
    ("Mites (Demodex/Sarcoptes)", "obs", "Negative"),
    ("Fungal Hyphae", "obs", "None Seen"),
    ("Ectoparasites", "obs", "Negative"),
];

const MILK: &[ParameterRow] = &[
    ("Somatic Cell Count", "cells/mL", "< 200000"),
    ("Fat Content", "%", "3.5 – 4.5"),
    ("Protein Content", "%", "3.0 – 3.5"),
];

const FECAL: &[ParameterRow] = &[
    ("Ova/Cysts", "obs", "None Seen"),
    ("Occult Blood", "qual", "Negative"),
    ("Consistency", "type", "Formed"),
];

/// Templates in display order.
pub(super) const BUILTIN_TEMPLATES: &[(&str, &[ParameterRow])] = &[
    ("CBP – Complete Blood Picture", COMPLETE_BLOOD_PICTURE),
    ("Blood Sugar Tests", BLOOD_SUGAR),
    ("Urine Examination", URINE_EXAMINATION),
    ("Liver Function Test (LFT)", LIVER_FUNCTION),
    ("Kidney Function Test (KFT)", KIDNEY_FUNCTION),
    ("Thyroid Profile", THYROID),
    ("Hormone & Vitamin Profile", HORMONE_VITAMIN),
    ("Lipid Profile", LIPID),
    ("Skin Scraping / Cytology", SKIN_CYTOLOGY),
    ("Milk Analysis", MILK),
    ("Fecal Analysis", FECAL),
];
