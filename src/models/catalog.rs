// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical muscle groups and exercise names.
//!
//! Strength records and post tags must use these values so the leaderboard
//! and feed filters group consistently.

use validator::ValidationError;

pub const MUSCLE_GROUPS: [&str; 8] = [
    "Pecho",
    "Espalda",
    "Deltoides",
    "Bíceps",
    "Tríceps",
    "Cuádriceps",
    "Isquiotibiales",
    "Abdomen",
];

pub const EXERCISE_NAMES: [&str; 64] = [
    // Pecho
    "Press de Banca Plano",
    "Press Inclinado con Mancuernas",
    "Aperturas en Peck Deck",
    "Cruces en Polea Alta",
    "Press Declinado con Barra",
    "Fondos en Paralelas (Pecho)",
    "Flexiones de Brazos",
    "Press de Banca en Máquina",
    // Espalda
    "Dominadas Lastradas",
    "Jalón al Pecho",
    "Remo con Barra",
    "Remo en Polea Baja",
    "Remo con Mancuerna a una Mano",
    "Pull-over en Polea Alta",
    "Remo T con Apoyo",
    "Hiperextensiones",
    // Deltoides
    "Press Militar con Barra",
    "Elevaciones Laterales con Mancuerna",
    "Press Arnold",
    "Face Pull en Polea",
    "Pájaros (Deltoide Posterior)",
    "Elevaciones Frontales con Disco",
    "Remo al Cuello en Polea",
    "Press de Hombro en Máquina",
    // Bíceps
    "Curl con Barra Z",
    "Curl Alterno con Mancuernas",
    "Curl Martillo",
    "Curl en Banco Predicador",
    "Curl Concentrado",
    "Curl en Polea Baja",
    "Curl tipo Spider",
    "Chin-ups (Bíceps)",
    // Tríceps
    "Extensiones en Polea Alta",
    "Press Francés con Barra Z",
    "Fondos entre Bancos",
    "Copa a una Mano con Mancuerna",
    "Patada de Tríceps en Polea",
    "Press de Banca Agarre Cerrado",
    "Extensiones tras nuca con cuerda",
    "Flexiones Diamante",
    // Cuádriceps
    "Sentadilla Libre con Barra",
    "Prensa de Piernas 45°",
    "Extensiones de Cuádriceps",
    "Zancadas con Mancuernas",
    "Sentadilla Hack",
    "Sentadilla Búlgara",
    "Sentadilla Frontal",
    "Step Up con Peso",
    // Isquiotibiales
    "Peso Muerto Rumano",
    "Curl Femoral Tumbado",
    "Curl Femoral Sentado",
    "Buenos Días con Barra",
    "Curl Femoral de Pie",
    "Puente de Glúteo / Isquio",
    "Peso Muerto con Piernas Rígidas",
    "Hip Thrust",
    // Abdomen
    "Crunch Abdominal en Máquina",
    "Elevación de Piernas Colgado",
    "Plancha Abdominal",
    "Rueda Abdominal",
    "Twist Ruso con Disco",
    "Woodchopper en Polea",
    "Crunch con Cable (Polea)",
    "Bicicleta Abdominal",
];

/// Muscle group an exercise belongs to. Groups own consecutive blocks of eight.
pub fn muscle_group_of(exercise: &str) -> Option<&'static str> {
    EXERCISE_NAMES
        .iter()
        .position(|name| *name == exercise)
        .map(|idx| MUSCLE_GROUPS[idx / 8])
}

pub fn is_muscle_group(value: &str) -> bool {
    MUSCLE_GROUPS.contains(&value)
}

pub fn is_exercise_name(value: &str) -> bool {
    EXERCISE_NAMES.contains(&value)
}

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validator hook: value must be a catalogue muscle group.
pub fn validate_muscle_group(value: &str) -> Result<(), ValidationError> {
    if is_muscle_group(value) {
        Ok(())
    } else {
        Err(rejected("muscle_group", "Unknown muscle group"))
    }
}

/// Validator hook: value must be a catalogue exercise name.
pub fn validate_exercise_name(value: &str) -> Result<(), ValidationError> {
    if is_exercise_name(value) {
        Ok(())
    } else {
        Err(rejected("exercise_name", "Unknown exercise"))
    }
}

/// Validator hook: every tag must be a catalogue muscle group.
pub fn validate_muscle_group_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().all(|tag| is_muscle_group(tag)) {
        Ok(())
    } else {
        Err(rejected(
            "muscle_groups",
            "One or more muscle groups are not valid",
        ))
    }
}
